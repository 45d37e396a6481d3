//! # Installer Backends
//!
//! Callers pick an [`InstallerBackend`] explicitly and ask it for the command that
//! installs a requirements file. This crate only builds commands; running them is
//! up to the caller.
//!
//! [`InstallPlanner`] decides which components need installing at all, by
//! normalizing each component's requirements and checking them against a
//! [`PackageRegistry`] of what is already present.

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use bon::Builder;
use getset::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::{Component, ConflictAnalysis, ConflictDetector, Normalizer, PackageRegistry};

/// The tool that performs installs.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    Default,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InstallerBackend {
    /// `python -m pip`
    #[default]
    Pip,

    /// `uv pip`, pointed at the interpreter with `--python`.
    Uv,
}

impl InstallerBackend {
    /// The command installing a requirements file into the environment of `python`.
    ///
    /// ```
    /// # use pyreq::InstallerBackend;
    /// let command = InstallerBackend::Uv.install_requirements("venv/bin/python", "requirements.txt");
    /// assert_eq!(command.program(), "uv");
    /// assert_eq!(
    ///     command.args(),
    ///     &["pip", "install", "-r", "requirements.txt", "--python", "venv/bin/python"],
    /// );
    /// ```
    pub fn install_requirements(
        self,
        python: impl AsRef<OsStr>,
        requirements_file: impl AsRef<OsStr>,
    ) -> InstallCommand {
        let install = [OsStr::new("-r"), requirements_file.as_ref()];
        self.command(python.as_ref(), install)
    }

    /// The command installing individual requirement strings.
    pub fn install_packages<S: AsRef<OsStr>>(
        self,
        python: impl AsRef<OsStr>,
        packages: &[S],
    ) -> InstallCommand {
        self.command(python.as_ref(), packages.iter().map(AsRef::as_ref))
    }

    fn command<'a>(self, python: &OsStr, install: impl IntoIterator<Item = &'a OsStr>) -> InstallCommand {
        let mut args = Vec::new();
        let program = match self {
            Self::Pip => {
                args.extend(["-m", "pip", "install"].map(OsString::from));
                args.extend(install.into_iter().map(OsStr::to_os_string));
                python.to_os_string()
            }
            Self::Uv => {
                args.extend(["pip", "install"].map(OsString::from));
                args.extend(install.into_iter().map(OsStr::to_os_string));
                args.extend([OsString::from("--python"), python.to_os_string()]);
                OsString::from("uv")
            }
        };
        InstallCommand { program, args }
    }
}

/// A program and its arguments, ready to be spawned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct InstallCommand {
    /// The executable.
    program: OsString,

    /// Its arguments, in order.
    args: Vec<OsString>,
}

impl InstallCommand {
    /// Build a [`Command`] for this invocation without spawning it.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl std::fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// A component together with the requirements file it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct ComponentManifest {
    /// The component's name.
    name: String,

    /// Where its requirements were read from.
    requirements_file: PathBuf,

    /// The raw lines of that file.
    requirements: Vec<String>,
}

impl ComponentManifest {
    /// Create a manifest from a file path and its raw lines.
    pub fn new(
        name: impl Into<String>,
        requirements_file: impl Into<PathBuf>,
        requirements: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            requirements_file: requirements_file.into(),
            requirements: requirements.into_iter().map(Into::into).collect(),
        }
    }
}

/// One install the planner decided is needed.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct InstallStep {
    /// The component being installed.
    component: String,

    /// Its normalized requirements that the registry does not satisfy.
    missing: Vec<String>,

    /// The command installing its requirements file.
    command: InstallCommand,
}

/// Decides, per component, whether its requirements file needs installing.
///
/// ```
/// # use pyreq::{ComponentManifest, InstallPlanner, InstalledPackage, InstallerBackend, PackageRegistry};
/// let planner = InstallPlanner::builder()
///     .backend(InstallerBackend::Pip)
///     .registry(PackageRegistry::default().with_package("numpy", InstalledPackage::new("1.26.4")))
///     .build();
///
/// let steps = planner.plan("python", &[
///     ComponentManifest::new("ready", "ready/requirements.txt", ["numpy>=1.20"]),
///     ComponentManifest::new("needs-scipy", "scipy/requirements.txt", ["numpy", "scipy"]),
/// ]);
/// assert_eq!(steps.len(), 1);
/// assert_eq!(steps[0].component(), "needs-scipy");
/// assert_eq!(steps[0].missing(), &["scipy"]);
/// ```
#[derive(Debug, Clone, Builder, Getters)]
#[getset(get = "pub")]
pub struct InstallPlanner {
    /// The backend commands are built for.
    #[builder(default)]
    backend: InstallerBackend,

    /// What is already installed.
    #[builder(default)]
    registry: PackageRegistry,

    /// How requirement lines are normalized before checking.
    #[builder(default)]
    normalizer: Normalizer,
}

impl InstallPlanner {
    /// Plan installs for components in discovery order.
    ///
    /// A component is installed when any of its normalized requirements is unsatisfied.
    pub fn plan(&self, python: impl AsRef<Path>, manifests: &[ComponentManifest]) -> Vec<InstallStep> {
        let python = python.as_ref();
        manifests
            .iter()
            .filter_map(|manifest| {
                let normalized = self.normalizer.normalize(&manifest.requirements);
                let missing = self.registry.unsatisfied(&normalized);
                if missing.is_empty() {
                    debug!(component = %manifest.name, "requirements already satisfied");
                    return None;
                }

                let command = self
                    .backend
                    .install_requirements(python, &manifest.requirements_file);
                info!(component = %manifest.name, missing = ?missing, %command, "install needed");
                Some(InstallStep {
                    component: manifest.name.clone(),
                    missing,
                    command,
                })
            })
            .collect()
    }

    /// Normalize every manifest and check the results against each other.
    pub fn conflicts(&self, manifests: &[ComponentManifest]) -> ConflictAnalysis {
        let components = manifests
            .iter()
            .map(|manifest| {
                Component::new(
                    manifest.name.clone(),
                    self.normalizer.normalize(&manifest.requirements),
                )
            })
            .collect::<Vec<_>>();
        ConflictDetector::detect(&components)
    }
}
