use derive_more::Display;
use lazy_regex::regex;
use serde::{Deserialize, Serialize};

/// A distribution name normalized per PEP 503.
///
/// Names are lower-cased and every run of `-`, `_` and `.` becomes a single `-`,
/// so `Typing_Extensions`, `typing-extensions` and `typing.extensions`
/// all refer to the same package.
///
/// ```
/// # use pyreq::PackageName;
/// assert_eq!(PackageName::new("Typing__Extensions"), PackageName::new("typing.extensions"));
/// assert_eq!(PackageName::new("Typing__Extensions").as_str(), "typing-extensions");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Normalize a distribution name.
    pub fn new(name: impl AsRef<str>) -> Self {
        let lowered = name.as_ref().trim().to_lowercase();
        Self(regex!(r"[-_.]+").replace_all(&lowered, "-").into_owned())
    }

    /// View the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for PackageName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<PackageName> for String {
    fn from(name: PackageName) -> Self {
        name.0
    }
}
