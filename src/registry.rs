use derive_new::new;
use getset::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PackageName, Requirement, VersionOrUrl, constraint::pep440};

/// A distribution present in an environment.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
#[getset(get = "pub")]
pub struct InstalledPackage {
    /// The installed version, as reported by the environment.
    #[new(into)]
    version: String,

    /// The requirement strings this distribution declares.
    #[new(default)]
    #[serde(default)]
    requires: Vec<String>,
}

impl InstalledPackage {
    /// Set the declared dependencies.
    pub fn with_requires(mut self, requires: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }
}

/// What is installed in an environment, resolved once and passed around explicitly.
///
/// ```
/// # use pyreq::{InstalledPackage, PackageRegistry};
/// let registry = PackageRegistry::default()
///     .with_package("Pillow", InstalledPackage::new("10.2.0"))
///     .with_package("torch", InstalledPackage::new("2.1.0+cu118"));
///
/// assert!(registry.is_satisfied("pillow>=9.0"));
/// assert!(registry.is_satisfied("torch==2.1.0+cu118"));
/// assert!(!registry.is_satisfied("torch>=2.3"));
/// assert!(!registry.is_satisfied("numpy"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageRegistry {
    packages: IndexMap<PackageName, InstalledPackage>,
}

impl PackageRegistry {
    /// Record an installed package, replacing any earlier entry for the same name.
    pub fn with_package(mut self, name: impl AsRef<str>, package: InstalledPackage) -> Self {
        self.packages.insert(PackageName::new(name), package);
        self
    }

    /// Look up an installed package by any spelling of its name.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&InstalledPackage> {
        self.packages.get(&PackageName::new(name))
    }

    /// Iterate installed packages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&PackageName, &InstalledPackage)> {
        self.packages.iter()
    }

    /// The number of installed packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// The dependencies a package declares, if it is installed.
    pub fn requires(&self, name: impl AsRef<str>) -> Option<&[String]> {
        self.get(name).map(|package| package.requires.as_slice())
    }

    /// Whether a requirement is met by what is installed.
    ///
    /// The package must be present and its version must satisfy every specifier.
    /// A direct URL reference is met by presence alone. A requirement that does
    /// not parse is treated as met, since there is nothing to act on.
    pub fn is_satisfied(&self, requirement: &str) -> bool {
        let parsed = match Requirement::parse(requirement) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(requirement, %error, "treating unparseable requirement as satisfied");
                return true;
            }
        };

        let Some(installed) = self.get(parsed.name()) else {
            return false;
        };

        match parsed.version_or_url() {
            None | Some(VersionOrUrl::Url(_)) => true,
            Some(VersionOrUrl::Specifiers(constraints)) => constraints
                .iter()
                .all(|constraint| pep440::satisfied_by(constraint, installed.version())),
        }
    }

    /// The requirements from a list that are not met, in input order.
    pub fn unsatisfied(&self, requirements: &[String]) -> Vec<String> {
        requirements
            .iter()
            .filter(|requirement| !self.is_satisfied(requirement))
            .cloned()
            .collect()
    }
}

impl FromIterator<(PackageName, InstalledPackage)> for PackageRegistry {
    fn from_iter<T: IntoIterator<Item = (PackageName, InstalledPackage)>>(iter: T) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}
