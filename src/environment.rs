use bon::Builder;
use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::MarkerVariable;

/// The values environment markers are evaluated against.
///
/// Callers usually obtain these from the interpreter they manage
/// and build the environment once per analysis pass.
///
/// ```
/// # use pyreq::MarkerEnvironment;
/// let env = MarkerEnvironment::builder()
///     .python_version("3.10")
///     .sys_platform("win32")
///     .build();
/// assert_eq!(env.sys_platform(), "win32");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Builder, Getters, Serialize, Deserialize)]
#[serde(default)]
#[getset(get = "pub")]
pub struct MarkerEnvironment {
    /// `python_version`, e.g. `3.10`.
    #[builder(default, into)]
    python_version: String,

    /// `python_full_version`, e.g. `3.10.12`.
    #[builder(default, into)]
    python_full_version: String,

    /// `sys_platform`, e.g. `linux`, `win32`, `darwin`.
    #[builder(default, into)]
    sys_platform: String,

    /// `os_name`, e.g. `posix`, `nt`.
    #[builder(default, into)]
    os_name: String,

    /// `platform_machine`, e.g. `x86_64`, `AMD64`, `arm64`.
    #[builder(default, into)]
    platform_machine: String,

    /// `platform_system`, e.g. `Linux`, `Windows`, `Darwin`.
    #[builder(default, into)]
    platform_system: String,

    /// `platform_release`, e.g. `6.5.0-1025-azure`.
    #[builder(default, into)]
    platform_release: String,

    /// `platform_version`, the kernel build string.
    #[builder(default, into)]
    platform_version: String,

    /// `platform_python_implementation`, e.g. `CPython`.
    #[builder(default, into)]
    platform_python_implementation: String,

    /// `implementation_name`, e.g. `cpython`.
    #[builder(default, into)]
    implementation_name: String,

    /// `implementation_version`, e.g. `3.10.12`.
    #[builder(default, into)]
    implementation_version: String,

    /// `extra`, the extra being installed, if any.
    #[builder(into)]
    extra: Option<String>,
}

impl MarkerEnvironment {
    /// Describe a CPython interpreter of the given version running on this host.
    ///
    /// Platform values are derived from the compile-time target, using the
    /// spellings CPython reports (`win32`, `nt`, `AMD64` on Windows).
    /// Release and kernel version are left empty.
    ///
    /// ```
    /// # use pyreq::MarkerEnvironment;
    /// let env = MarkerEnvironment::from_host("3.10.12");
    /// assert_eq!(env.python_version(), "3.10");
    /// assert_eq!(env.python_full_version(), "3.10.12");
    /// ```
    pub fn from_host(python_version: impl AsRef<str>) -> Self {
        use std::env::consts::{ARCH, OS};

        let full = python_version.as_ref().trim();
        let short = full.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");

        let (sys_platform, os_name, platform_system) = match OS {
            "windows" => ("win32", "nt", "Windows"),
            "macos" => ("darwin", "posix", "Darwin"),
            "linux" => ("linux", "posix", "Linux"),
            other => (other, "posix", other),
        };
        let platform_machine = match (OS, ARCH) {
            ("windows", "x86_64") => "AMD64",
            ("windows", "aarch64") => "ARM64",
            ("macos", "aarch64") => "arm64",
            (_, arch) => arch,
        };

        Self::builder()
            .python_version(short)
            .python_full_version(full)
            .sys_platform(sys_platform)
            .os_name(os_name)
            .platform_machine(platform_machine)
            .platform_system(platform_system)
            .platform_python_implementation("CPython")
            .implementation_name("cpython")
            .implementation_version(full)
            .build()
    }

    /// Return a copy of this environment with `extra` set.
    pub fn with_extra(&self, extra: impl Into<String>) -> Self {
        Self {
            extra: Some(extra.into()),
            ..self.clone()
        }
    }

    /// Look up the value bound to a marker variable.
    ///
    /// An unset `extra` reads as the empty string.
    pub fn get(&self, variable: MarkerVariable) -> &str {
        match variable {
            MarkerVariable::PythonVersion => &self.python_version,
            MarkerVariable::PythonFullVersion => &self.python_full_version,
            MarkerVariable::SysPlatform => &self.sys_platform,
            MarkerVariable::OsName => &self.os_name,
            MarkerVariable::PlatformMachine => &self.platform_machine,
            MarkerVariable::PlatformSystem => &self.platform_system,
            MarkerVariable::PlatformRelease => &self.platform_release,
            MarkerVariable::PlatformVersion => &self.platform_version,
            MarkerVariable::PlatformPythonImplementation => &self.platform_python_implementation,
            MarkerVariable::ImplementationName => &self.implementation_name,
            MarkerVariable::ImplementationVersion => &self.implementation_version,
            MarkerVariable::Extra => self.extra.as_deref().unwrap_or_default(),
        }
    }
}
