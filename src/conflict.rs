//! # Conflict Detection
//!
//! Finds packages whose declared version specifiers cannot hold together.
//!
//! Declarations are grouped by [`PackageName`]; within a group every ordered pair of
//! declarations is checked against a fixed matrix of operator pairs. The matrix is
//! not symmetric, so each pair is tried in both directions. Textually identical
//! declarations never conflict.
//!
//! The check is best effort: a declaration or version that does not parse skips the
//! comparisons it takes part in instead of failing the analysis.

use std::collections::HashSet;

use derive_more::Display;
use getset::Getters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter};
use tracing::debug;

use crate::{Comparable, Operator, PackageName, Requirement, Version};

/// The comparison that must hold between the left and right versions
/// for a pair of declarations to conflict.
///
/// Selected by [`ConflictRule::for_operators`] from the operators of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConflictRule {
    /// Left version is strictly greater than the right.
    LeftGreater,

    /// Left version is greater than or equal to the right.
    LeftGreaterOrEqual,

    /// Left version is strictly less than the right.
    LeftLess,

    /// Left version is less than or equal to the right.
    LeftLessOrEqual,

    /// The versions are equal.
    Same,

    /// The versions are not equal.
    Different,

    /// The version texts differ, ignoring case.
    DifferentText,
}

impl ConflictRule {
    /// Look up the rule for a pair of operators, left first.
    ///
    /// Pairs without an entry are never considered conflicting.
    /// `~=` against `~=` and `!=` against `~=` are among them.
    ///
    /// ```
    /// # use pyreq::{ConflictRule, Operator};
    /// assert_eq!(
    ///     ConflictRule::for_operators(Operator::GreaterOrEqual, Operator::Less),
    ///     Some(ConflictRule::LeftGreaterOrEqual),
    /// );
    /// assert_eq!(ConflictRule::for_operators(Operator::Less, Operator::GreaterOrEqual), None);
    /// ```
    pub fn for_operators(left: Operator, right: Operator) -> Option<Self> {
        use Operator::*;

        match (left, right) {
            (GreaterOrEqual, LessOrEqual) => Some(Self::LeftGreater),
            (GreaterOrEqual, Less) => Some(Self::LeftGreaterOrEqual),
            (Greater, LessOrEqual | Less) => Some(Self::LeftGreaterOrEqual),

            // Bounds against a pin; `~=` is judged by its lower bound.
            (Greater, Equal | Compatible) => Some(Self::LeftGreaterOrEqual),
            (GreaterOrEqual, Equal | Compatible) => Some(Self::LeftGreater),
            (Less, Equal | Compatible) => Some(Self::LeftLessOrEqual),
            (LessOrEqual, Equal | Compatible) => Some(Self::LeftLess),

            (NotEqual, Equal) => Some(Self::Same),
            (Compatible, Equal | ArbitraryEqual) => Some(Self::LeftGreater),
            (Equal, Equal) => Some(Self::Different),
            (ArbitraryEqual, ArbitraryEqual) => Some(Self::DifferentText),
            _ => None,
        }
    }

    /// Whether the rule holds for the given versions.
    pub fn holds(self, left: &Version, right: &Version) -> bool {
        match self {
            Self::LeftGreater => left > right,
            Self::LeftGreaterOrEqual => left >= right,
            Self::LeftLess => left < right,
            Self::LeftLessOrEqual => left <= right,
            Self::Same => left.equal(right),
            Self::Different => !left.equal(right),
            Self::DifferentText => !left.arbitrary_equal(right),
        }
    }
}

/// A named unit declaring requirements, such as a plugin or an extension.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Component {
    /// The component's name, used for attribution in reports.
    name: String,

    /// Its requirement lines, usually already normalized.
    requirements: Vec<String>,
}

impl Component {
    /// Create a component.
    pub fn new(
        name: impl Into<String>,
        requirements: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            requirements: requirements.into_iter().map(Into::into).collect(),
        }
    }
}

/// One requirement line as declared by one component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Getters, Serialize, Deserialize)]
#[display("{component} requires {requirement}")]
#[getset(get = "pub")]
pub struct Declaration {
    /// The declaring component.
    component: String,

    /// The requirement as written.
    requirement: String,
}

/// A pair of declarations that cannot both be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Getters, Serialize, Deserialize)]
#[display("conflicting requirements for {package}: {left}, but {right}")]
#[getset(get = "pub")]
pub struct ConflictReport {
    /// The package name, lower-cased as first declared.
    package: String,

    /// The declaration on the left of the rule.
    left: Declaration,

    /// The declaration on the right of the rule.
    right: Declaration,

    /// The rule that flagged the pair.
    rule: ConflictRule,
}

/// The outcome of a conflict scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct ConflictAnalysis {
    /// Package names with at least one conflict, deduplicated in first-seen order.
    packages: Vec<String>,

    /// Every conflicting pair, once per unordered pair of declarations.
    reports: Vec<ConflictReport>,
}

impl ConflictAnalysis {
    /// Whether no conflicts were found.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// The reports concerning one package.
    pub fn reports_for<'a>(
        &'a self,
        package: &'a str,
    ) -> impl Iterator<Item = &'a ConflictReport> + 'a {
        let package = PackageName::new(package);
        self.reports
            .iter()
            .filter(move |report| PackageName::new(&report.package) == package)
    }
}

/// A declaration with its parsed form.
struct Entry {
    declaration: Declaration,
    parsed: Requirement,
}

/// Scans components for conflicting declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector;

impl ConflictDetector {
    /// Check every component's declarations against each other.
    ///
    /// ```
    /// # use pyreq::{Component, ConflictDetector};
    /// let analysis = ConflictDetector::detect(&[
    ///     Component::new("upscaler", ["pillow>=10.0"]),
    ///     Component::new("legacy-nodes", ["Pillow<9.5"]),
    /// ]);
    /// assert_eq!(analysis.packages(), &["pillow"]);
    /// assert_eq!(analysis.reports()[0].left().component(), "upscaler");
    /// ```
    pub fn detect(components: &[Component]) -> ConflictAnalysis {
        let mut groups = IndexMap::<PackageName, Vec<Entry>>::new();
        for component in components {
            for line in component.requirements() {
                let parsed = match Requirement::parse(line) {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        debug!(component = %component.name(), %line, %error, "skipping unparseable declaration");
                        continue;
                    }
                };
                let declaration = Declaration {
                    component: component.name().clone(),
                    requirement: line.clone(),
                };
                groups
                    .entry(parsed.package_name())
                    .or_default()
                    .push(Entry { declaration, parsed });
            }
        }

        let mut analysis = ConflictAnalysis::default();
        for entries in groups.values() {
            let mut seen = HashSet::new();
            for (i, left) in entries.iter().enumerate() {
                for (j, right) in entries.iter().enumerate() {
                    if i == j || left.declaration.requirement == right.declaration.requirement {
                        continue;
                    }
                    if seen.contains(&(i.min(j), i.max(j))) {
                        continue;
                    }
                    let Some(rule) = conflicting_rule(left, right) else {
                        continue;
                    };

                    seen.insert((i.min(j), i.max(j)));
                    let package = entries
                        .first()
                        .map(|first| first.parsed.name().to_lowercase())
                        .unwrap_or_default();
                    debug!(%package, left = %left.declaration, right = %right.declaration, %rule, "found conflict");

                    if !analysis.packages.contains(&package) {
                        analysis.packages.push(package.clone());
                    }
                    analysis.reports.push(ConflictReport {
                        package,
                        left: left.declaration.clone(),
                        right: right.declaration.clone(),
                        rule,
                    });
                }
            }
        }
        analysis
    }
}

/// The first rule flagging any specifier of `left` against any specifier of `right`.
fn conflicting_rule(left: &Entry, right: &Entry) -> Option<ConflictRule> {
    let (Some(left_constraints), Some(right_constraints)) =
        (left.parsed.constraints(), right.parsed.constraints())
    else {
        return None;
    };

    for l in left_constraints {
        for r in right_constraints {
            let Some(rule) = ConflictRule::for_operators(l.operator(), r.operator()) else {
                continue;
            };
            match (Version::parse(l.version()), Version::parse(r.version())) {
                (Ok(lv), Ok(rv)) => {
                    if rule.holds(&lv, &rv) {
                        return Some(rule);
                    }
                }
                _ => debug!(left = %l, right = %r, "skipping comparison of unparseable versions"),
            }
        }
    }
    None
}

/// Find packages declared with conflicting specifiers in a flat requirement list.
///
/// Returns the package names lower-cased as first declared, deduplicated.
///
/// ```
/// # use pyreq::find_conflicts;
/// assert_eq!(find_conflicts(&["pkg>=2.0", "pkg<1.0"]), vec!["pkg"]);
/// assert!(find_conflicts(&["pkg==1.0.0", "pkg==1.0.0"]).is_empty());
/// ```
pub fn find_conflicts(requirements: &[impl AsRef<str>]) -> Vec<String> {
    let component = Component::new(
        "requirements",
        requirements.iter().map(|line| line.as_ref().to_string()),
    );
    ConflictDetector::detect(&[component]).packages
}
