//! # Fallback Comparisons
//!
//! Not every version string a Python environment reports is PEP 440:
//! nightly builds carry dates, vendored forks carry commit hashes, and
//! some distributions invent their own suffixes. This module provides the
//! two comparisons used when strict parsing is not an option.
//!
//! ## String to String
//!
//! - Ordered constraints (less, greater) compare the strings byte by byte;
//!   callers lower-case both sides first when case should not matter
//! - [`Constraint::Compatible`](super::Constraint::Compatible) performs a case-insensitive equality check
//!
//! ## Loose dotted versions
//!
//! [`compare_loose`] splits both inputs on `.`, `-`, `_` and `+`, drops ASCII letters
//! from each segment and compares the remaining integers, zero padded.
//! When any segment does not reduce to an integer the whole comparison falls back
//! to lexical ordering. It never fails.
//! [`LooseVersion`] wraps a string so it can be used with [`Constraint`](super::Constraint).

use std::cmp::Ordering;

use derive_more::{AsRef, Display, From};
use lexical_sort::lexical_cmp;
use serde::{Deserialize, Serialize};
use unicase::UniCase;

use super::Comparable;

impl<S: AsRef<str>> Comparable<S> for String {
    fn compatible(&self, rev: &S) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(rev.as_ref())
    }

    fn equal(&self, rev: &S) -> bool {
        self.as_str() == rev.as_ref()
    }

    fn less(&self, rev: &S) -> bool {
        rev.as_ref() < self.as_str()
    }

    fn greater(&self, rev: &S) -> bool {
        rev.as_ref() > self.as_str()
    }

    fn arbitrary_equal(&self, rev: &S) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(rev.as_ref())
    }

    fn less_or_equal(&self, rev: &S) -> bool {
        rev.as_ref() <= self.as_str()
    }

    fn greater_or_equal(&self, rev: &S) -> bool {
        rev.as_ref() >= self.as_str()
    }
}

/// Compare two version-like strings by their dotted integer segments.
///
/// ```
/// # use std::cmp::Ordering;
/// # use pyreq::constraint::fallback::compare_loose;
/// assert_eq!(compare_loose("1.10", "1.9"), Ordering::Greater);
/// assert_eq!(compare_loose("2.0", "2"), Ordering::Equal);
/// assert_eq!(compare_loose("v20240101", "v20231231"), Ordering::Greater);
/// ```
pub fn compare_loose(a: &str, b: &str) -> Ordering {
    match (loose_segments(a), loose_segments(b)) {
        (Some(left), Some(right)) => {
            let len = left.len().max(right.len());
            (0..len)
                .map(|i| {
                    let l = left.get(i).copied().unwrap_or(0);
                    let r = right.get(i).copied().unwrap_or(0);
                    l.cmp(&r)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        }
        _ => lexical_cmp(a, b),
    }
}

fn loose_segments(input: &str) -> Option<Vec<u64>> {
    input
        .trim()
        .split(['.', '-', '_', '+'])
        .map(|segment| {
            let digits = segment
                .chars()
                .filter(|c| !c.is_ascii_alphabetic())
                .collect::<String>();
            digits.parse::<u64>().ok()
        })
        .collect()
}

/// A version string compared with [`compare_loose`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, AsRef, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LooseVersion(String);

impl From<&str> for LooseVersion {
    fn from(version: &str) -> Self {
        Self(version.to_string())
    }
}

impl LooseVersion {
    /// View the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn leading_segment(&self) -> Option<&str> {
        self.0.trim().split(['.', '-', '_', '+']).next()
    }
}

impl Comparable<LooseVersion> for LooseVersion {
    /// Loose versions carry no reliable structure beyond their first segment,
    /// so `~=` requires that segment to agree and the target to be at least `self`.
    fn compatible(&self, v: &LooseVersion) -> bool {
        self.leading_segment() == v.leading_segment() && self.greater_or_equal(v)
    }

    fn equal(&self, v: &LooseVersion) -> bool {
        compare_loose(v.as_str(), self.as_str()).is_eq()
    }

    fn less(&self, v: &LooseVersion) -> bool {
        compare_loose(v.as_str(), self.as_str()).is_lt()
    }

    fn greater(&self, v: &LooseVersion) -> bool {
        compare_loose(v.as_str(), self.as_str()).is_gt()
    }

    fn arbitrary_equal(&self, v: &LooseVersion) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(v.as_str())
    }
}
