//! # PEP 440 Versions
//!
//! Python versions follow this structure: `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`,
//! for example `1!2.3.4a5.post6.dev7+cu118`.
//!
//! - **Epoch**: `N!`, overrides normal version ordering (defaults to `0!`)
//! - **Release**: `N(.N)*`, the core version numbers (like `1.2.3`)
//! - **Pre-release**: `a1` (alpha), `b2` (beta), `rc3`; `alpha`, `beta`, `c`, `pre`
//!   and `preview` are accepted spellings
//! - **Post-release**: `.post1`, or the implicit `-1`; `rev` and `r` are accepted spellings
//! - **Development**: `.dev1`
//! - **Local**: `+ubuntu.1`, the part after `+`
//!
//! Separators between parts may be `.`, `-`, `_` or omitted, input is
//! case-insensitive, and a leading `v` is ignored.
//! A trailing `.*` (or `*`) marks the version as a wildcard pattern used by `==1.0.*`.
//!
//! ## Ordering
//!
//! 1. epoch
//! 2. release, zero padded (`1.0 == 1.0.0`)
//! 3. pre-release: a version without one sorts above any that has one (`1.0a1 < 1.0`)
//! 4. post-release: a missing post-release counts as 0 (`1.0 < 1.0.post1`)
//! 5. dev-release: a version without one sorts above any that has one (`1.0.dev1 < 1.0`)
//! 6. local: a version without one sorts below any that has one;
//!    numeric segments sort above text segments
//!
//! See [PEP 440](https://peps.python.org/pep-0440/) for more information.

use std::{cmp::Ordering, str::FromStr};

use bon::Builder;
use getset::{CopyGetters, Getters};
use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alphanumeric1, char, digit1, one_of},
    combinator::{map, map_res, opt},
    multi::separated_list1,
    sequence::{preceded, terminated},
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use unicase::UniCase;

use crate::{Comparable, VersionError};

/// A parsed PEP 440 version.
///
/// Equality and ordering follow the PEP 440 rules described in the module docs,
/// so `1.0` and `1.0.0` are equal even though they were written differently.
/// The text the version was parsed from is retained and used by `===`.
#[derive(Debug, Clone, Builder, Getters, CopyGetters, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// The epoch of the version; most versions have an epoch of 0, which is the default.
    #[builder(default)]
    #[getset(get_copy = "pub")]
    epoch: u64,

    /// The release segments of the version, e.g. `[1, 2, 3]` for `1.2.3`.
    #[builder(into)]
    #[getset(get = "pub")]
    release: Vec<u64>,

    /// An optional pre-release, e.g. `rc 4` for `1.2.3rc4`.
    #[getset(get_copy = "pub")]
    pre: Option<PreRelease>,

    /// An optional post-release, e.g. `5` for both `1.2.3.post5` and `1.2.3-5`.
    #[getset(get_copy = "pub")]
    post: Option<u64>,

    /// An optional dev-release, e.g. `6` for `1.2.3.dev6`.
    #[getset(get_copy = "pub")]
    dev: Option<u64>,

    /// The local version label, e.g. `[cu, 118]` for `2.0.1+cu.118`.
    #[builder(into)]
    #[getset(get = "pub")]
    local: Option<Vec<LocalSegment>>,

    /// Whether the version was written as a prefix pattern (`1.0.*`).
    #[builder(default)]
    #[getset(get_copy = "pub")]
    wildcard: bool,

    /// The trimmed input this version was parsed from.
    #[builder(default, into)]
    raw: String,
}

/// The pre-release kind and number.
///
/// `{a|alpha|b|beta|rc|c|pre|preview}N`; N defaults to 0 when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    /// `aN` | `alphaN`
    Alpha(u64),

    /// `bN` | `betaN`
    Beta(u64),

    /// `rcN` | `cN` | `preN` | `previewN`
    Rc(u64),
}

/// One dot-separated segment of a local version label.
///
/// Variant order matters: text sorts below numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    /// A segment containing any letter, compared case-insensitively.
    Text(String),

    /// A purely numeric segment.
    Number(u64),
}

impl Version {
    /// Parse and normalize a PEP 440 version.
    ///
    /// ```
    /// # use pyreq::Version;
    /// let version = Version::parse("v1.0-RC.2").unwrap();
    /// assert_eq!(version.to_string(), "1.0rc2");
    ///
    /// let pattern = Version::parse("2.1.*").unwrap();
    /// assert!(pattern.wildcard());
    /// ```
    #[tracing::instrument]
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        let lowered = raw.to_lowercase();
        let (body, wildcard) = match lowered
            .strip_suffix(".*")
            .or_else(|| lowered.strip_suffix('*'))
        {
            Some(body) => (body, true),
            None => (lowered.as_str(), false),
        };

        let invalid = |message: String| VersionError::InvalidVersion {
            version: input.to_string(),
            message,
        };

        let (remaining, mut version) = Version::parser(body)
            .finish()
            .map_err(|e| invalid(format!("expected a version at '{}'", e.input)))?;
        if !remaining.is_empty() {
            return Err(invalid(format!("unexpected trailing text: '{remaining}'")));
        }

        version.wildcard = wildcard;
        version.raw = raw.to_string();
        Ok(version)
    }

    /// The nom parser for the normalized body of a version, without any wildcard suffix.
    pub(crate) fn parser(input: &str) -> IResult<&str, Version> {
        fn number(input: &str) -> IResult<&str, u64> {
            map_res(digit1, str::parse::<u64>).parse(input)
        }

        fn separator(input: &str) -> IResult<&str, char> {
            one_of(".-_").parse(input)
        }

        // The number after a label may itself be separated: `1.0-rc.2`.
        fn label_number(input: &str) -> IResult<&str, u64> {
            map(opt(preceded(opt(separator), number)), Option::unwrap_or_default).parse(input)
        }

        fn epoch(input: &str) -> IResult<&str, u64> {
            terminated(number, char('!')).parse(input)
        }

        fn release(input: &str) -> IResult<&str, Vec<u64>> {
            separated_list1(char('.'), number).parse(input)
        }

        fn pre_release(input: &str) -> IResult<&str, PreRelease> {
            let alpha = map(
                preceded(alt((tag("alpha"), tag("a"))), label_number),
                PreRelease::Alpha,
            );
            let beta = map(
                preceded(alt((tag("beta"), tag("b"))), label_number),
                PreRelease::Beta,
            );
            let rc = map(
                preceded(
                    alt((tag("preview"), tag("pre"), tag("rc"), tag("c"))),
                    label_number,
                ),
                PreRelease::Rc,
            );
            preceded(opt(separator), alt((alpha, beta, rc))).parse(input)
        }

        fn post_release(input: &str) -> IResult<&str, u64> {
            let explicit = preceded(
                opt(separator),
                preceded(alt((tag("post"), tag("rev"), tag("r"))), label_number),
            );
            let implicit = preceded(char('-'), number);
            alt((explicit, implicit)).parse(input)
        }

        fn dev_release(input: &str) -> IResult<&str, u64> {
            preceded(opt(separator), preceded(tag("dev"), label_number)).parse(input)
        }

        fn local(input: &str) -> IResult<&str, Vec<LocalSegment>> {
            let segment = map(alphanumeric1, |s: &str| match s.parse::<u64>() {
                Ok(n) => LocalSegment::Number(n),
                Err(_) => LocalSegment::Text(s.to_string()),
            });
            preceded(char('+'), separated_list1(separator, segment)).parse(input)
        }

        let (input, _) = opt(char('v')).parse(input)?;
        let (input, epoch) = opt(epoch).parse(input)?;
        let (input, release) = release(input)?;
        let (input, pre) = opt(pre_release).parse(input)?;
        let (input, post) = opt(post_release).parse(input)?;
        let (input, dev) = opt(dev_release).parse(input)?;
        let (input, local) = opt(local).parse(input)?;

        Ok((
            input,
            Version {
                epoch: epoch.unwrap_or_default(),
                release,
                pre,
                post,
                dev,
                local,
                wildcard: false,
                raw: String::new(),
            },
        ))
    }

    /// The text this version was parsed from, trimmed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this version carries a pre-release or dev-release marker.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The compatible release check (`~=`), with `self` as the constraint version.
    ///
    /// The prefix is the release minus its final segment; `target` must share
    /// that prefix (zero padded) and compare at least equal to `self`.
    /// When `self` is a wildcard pattern the lower bound compares release
    /// segments only, so `1.0*` accepts `1.0a1`.
    ///
    /// ```
    /// # use pyreq::Version;
    /// let v = |s| Version::parse(s).unwrap();
    /// assert!(v("1.4.5").compatible_with(&v("1.4.9")));
    /// assert!(!v("1.4.5").compatible_with(&v("1.5.0")));
    /// assert!(v("1.0*").compatible_with(&v("1.0a1")));
    /// assert!(!v("0.9*").compatible_with(&v("1.0")));
    /// ```
    pub fn compatible_with(&self, target: &Version) -> bool {
        if self.epoch != target.epoch {
            return false;
        }

        if self.release.len() < 2 {
            warn!("compatible release on single segment version {self}; only the lower bound applies");
        }

        let prefix_len = self.release.len().saturating_sub(1);
        let shares_prefix = self.release[..prefix_len]
            .iter()
            .enumerate()
            .all(|(i, segment)| target.release_segment(i) == *segment);
        if !shares_prefix {
            return false;
        }

        if self.wildcard {
            compare_release(&target.release, &self.release).is_ge()
        } else {
            target >= self
        }
    }

    /// The prefix match used by `==1.0.*`, with `self` as the pattern.
    ///
    /// Epochs must agree and every release segment of the pattern must equal
    /// the target's segment at the same position. Pre, post, dev and local
    /// parts of the target are ignored.
    pub fn matches_wildcard(&self, target: &Version) -> bool {
        self.epoch == target.epoch
            && self
                .release
                .iter()
                .enumerate()
                .all(|(i, segment)| target.release_segment(i) == *segment)
    }

    fn release_segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }
}

fn compare_release(left: &[u64], right: &[u64]) -> Ordering {
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

// Absence of the marker sorts above its presence.
fn compare_absent_high<T: Ord>(left: &Option<T>, right: &Option<T>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => l.cmp(r),
    }
}

/// Total order over versions.
///
/// ```
/// # use std::cmp::Ordering;
/// # use pyreq::{Version, compare};
/// let v = |s| Version::parse(s).unwrap();
/// assert_eq!(compare(&v("1.0a1"), &v("1.0")), Ordering::Less);
/// assert_eq!(compare(&v("1.0.0"), &v("1.0")), Ordering::Equal);
/// ```
pub fn compare(a: &Version, b: &Version) -> Ordering {
    compare_public(a, b).then_with(|| a.local.cmp(&b.local))
}

fn compare_public(a: &Version, b: &Version) -> Ordering {
    a.epoch
        .cmp(&b.epoch)
        .then_with(|| compare_release(&a.release, &b.release))
        .then_with(|| compare_absent_high(&a.pre, &b.pre))
        .then_with(|| a.post.unwrap_or_default().cmp(&b.post.unwrap_or_default()))
        .then_with(|| compare_absent_high(&a.dev, &b.dev))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other).is_eq()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Comparable<Version> for Version {
    fn compatible(&self, v: &Version) -> bool {
        self.compatible_with(v)
    }

    fn equal(&self, v: &Version) -> bool {
        match (self.wildcard, v.wildcard) {
            (true, _) => self.matches_wildcard(v),
            (false, true) => v.matches_wildcard(self),
            // A public version ignores the candidate's local label.
            (false, false) if self.local.is_none() => compare_public(self, v).is_eq(),
            (false, false) => v == self,
        }
    }

    fn less(&self, v: &Version) -> bool {
        v < self
    }

    fn greater(&self, v: &Version) -> bool {
        v > self
    }

    fn arbitrary_equal(&self, v: &Version) -> bool {
        UniCase::new(self.as_str()) == UniCase::new(v.as_str())
    }

    fn less_or_equal(&self, v: &Version) -> bool {
        self.equal(v) || v < self
    }

    fn greater_or_equal(&self, v: &Version) -> bool {
        self.equal(v) || v > self
    }
}

impl std::fmt::Display for PreRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreRelease::Alpha(n) => write!(f, "a{n}"),
            PreRelease::Beta(n) => write!(f, "b{n}"),
            PreRelease::Rc(n) => write!(f, "rc{n}"),
        }
    }
}

impl std::fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalSegment::Text(text) => f.write_str(text),
            LocalSegment::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Renders the normalized form, e.g. `1!2.0rc1.post2.dev3+local.7`.
impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        for (i, segment) in self.release.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        if let Some(pre) = &self.pre {
            write!(f, "{pre}")?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{post}")?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{dev}")?;
        }
        if let Some(local) = &self.local {
            for (i, segment) in local.iter().enumerate() {
                f.write_str(if i == 0 { "+" } else { "." })?;
                write!(f, "{segment}")?;
            }
        }
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
