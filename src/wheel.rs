//! Wheel filenames: `{name}-{version}(-{build})?-{python}-{abi}-{platform}.whl`.
//!
//! See the [binary distribution format](https://packaging.python.org/en/latest/specifications/binary-distribution-format/).

use getset::Getters;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::WheelFilenameError;

/// The components of a wheel filename.
///
/// ```
/// # use pyreq::wheel::WheelFilename;
/// let wheel = WheelFilename::parse("torch-2.1.0+cu118-cp310-cp310-linux_x86_64.whl").unwrap();
/// assert_eq!(wheel.name(), "torch");
/// assert_eq!(wheel.version(), "2.1.0+cu118");
/// assert_eq!(wheel.platform_tag(), "linux_x86_64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct WheelFilename {
    /// The distribution name, with `_` as written in the filename.
    name: String,

    /// The version, as written.
    version: String,

    /// The optional build tag.
    build: Option<String>,

    /// The Python tag, e.g. `cp310` or `py3`.
    python_tag: String,

    /// The ABI tag, e.g. `cp310` or `none`.
    abi_tag: String,

    /// The platform tag, e.g. `win_amd64` or `any`.
    platform_tag: String,
}

impl WheelFilename {
    /// Parse a bare wheel filename.
    #[tracing::instrument]
    pub fn parse(filename: &str) -> Result<Self, WheelFilenameError> {
        let invalid = |message: &str| WheelFilenameError::InvalidFilename {
            filename: filename.to_string(),
            message: message.to_string(),
        };

        let trimmed = filename.trim();
        let stem = trimmed
            .len()
            .checked_sub(".whl".len())
            .filter(|&at| trimmed.is_char_boundary(at))
            .filter(|&at| trimmed[at..].eq_ignore_ascii_case(".whl"))
            .map(|at| &trimmed[..at])
            .ok_or_else(|| invalid("missing .whl suffix"))?;

        let parts = stem.split('-').collect::<Vec<_>>();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(invalid("empty component"));
        }

        let (name, version, build, python_tag, abi_tag, platform_tag) = match parts.as_slice() {
            [name, version, python, abi, platform] => (name, version, None, python, abi, platform),
            [name, version, build, python, abi, platform] => {
                if !build.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(invalid("build tag must start with a digit"));
                }
                (name, version, Some(build.to_string()), python, abi, platform)
            }
            _ => return Err(invalid("expected 5 or 6 dash separated components")),
        };

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            build,
            python_tag: python_tag.to_string(),
            abi_tag: abi_tag.to_string(),
            platform_tag: platform_tag.to_string(),
        })
    }

    /// Parse the wheel filename at the end of a URL path.
    ///
    /// The final path segment is percent-decoded; query and fragment are ignored.
    ///
    /// ```
    /// # use pyreq::wheel::WheelFilename;
    /// let url = "https://download.pytorch.org/whl/cu118/torch-2.1.0%2Bcu118-cp310-cp310-win_amd64.whl#sha256=abc";
    /// let wheel = WheelFilename::from_url(url).unwrap();
    /// assert_eq!(wheel.version(), "2.1.0+cu118");
    /// ```
    #[tracing::instrument]
    pub fn from_url(url: &str) -> Result<Self, WheelFilenameError> {
        let invalid = |message: String| WheelFilenameError::InvalidUrl {
            url: url.to_string(),
            message,
        };

        let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
        let segment = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| invalid(String::from("no filename in url path")))?;
        let filename = urlencoding::decode(segment).map_err(|e| invalid(e.to_string()))?;

        Self::parse(&filename)
    }

    /// Render as the `name==version` requirement this wheel satisfies.
    pub fn to_requirement(&self) -> String {
        format!("{}=={}", self.name, self.version)
    }
}

/// Whether a URL points at a wheel, ignoring query and fragment.
pub fn is_wheel_url(url: &str) -> bool {
    Url::parse(url.trim()).is_ok_and(|parsed| {
        matches!(parsed.scheme(), "http" | "https") && parsed.path().to_lowercase().ends_with(".whl")
    })
}
