//! # Version Constraints
//!
//! A version specifier like `>=1.0` pairs an [`Operator`] with a version.
//! This module models that pairing generically so the same operator logic
//! can be evaluated against strict PEP 440 versions, lenient dotted versions,
//! or opaque strings.
//!
//! ## Core Components
//!
//! - [`Constraint<V>`]: a single specifier (`~=`, `==`, `===`, `!=`, `<`, `<=`, `>`, `>=`)
//!   where `V` is the constraint's version type.
//! - [`Constraints<V>`]: an ordered list of specifiers, as written after a package name.
//! - [`Comparable<T>`]: the comparison rules a version type brings to the constraint system.
//! - [`Operator`]: the bare operator, used where the version is evaluated separately
//!   (conflict detection, marker expressions).
//!
//! ## Version Types
//!
//! - `pep440`: strict PEP 440 comparison for [`Version`](crate::Version).
//! - `fallback`: plain string comparison and the lenient dotted comparator
//!   used for version strings that are not PEP 440 (build dates, commit-ish values).

use derive_new::new;
use enum_assoc::Assoc;
use nom::{IResult, Parser, branch::alt, bytes::complete::tag, combinator::value};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub mod fallback;
pub mod pep440;

/// Enables comparison between constraint versions and target versions.
///
/// `Self` is the version written in the constraint; `V` is the version being tested.
/// Methods check the *target* against `self`: `less` answers "is `v` less than `self`",
/// which is what a `< self` specifier needs.
///
/// Default implementations are provided for the derived operations
/// (`not_equal`, `less_or_equal`, `greater_or_equal`, `arbitrary_equal`).
pub trait Comparable<V> {
    /// Implements the "compatible release" constraint (`~=`).
    ///
    /// `~= 2.2` means `>= 2.2, == 2.*`; `~= 1.4.5` means `>= 1.4.5, == 1.4.*`.
    fn compatible(&self, v: &V) -> bool;

    /// Implements the "equal to" constraint (`==`).
    ///
    /// Implementations decide how trailing zeros and wildcard patterns are treated.
    fn equal(&self, v: &V) -> bool;

    /// Implements the "less than" constraint (`<`): is `v` less than `self`?
    fn less(&self, v: &V) -> bool;

    /// Implements the "greater than" constraint (`>`): is `v` greater than `self`?
    fn greater(&self, v: &V) -> bool;

    /// Implements the "arbitrary equality" constraint (`===`).
    ///
    /// Defaults to `equal`; version types that retain their original text
    /// compare that text instead.
    fn arbitrary_equal(&self, v: &V) -> bool {
        self.equal(v)
    }

    /// Implements the "not equal to" constraint (`!=`).
    fn not_equal(&self, v: &V) -> bool {
        !self.equal(v)
    }

    /// Implements the "less than or equal to" constraint (`<=`).
    fn less_or_equal(&self, v: &V) -> bool {
        self.equal(v) || self.less(v)
    }

    /// Implements the "greater than or equal to" constraint (`>=`).
    fn greater_or_equal(&self, v: &V) -> bool {
        self.equal(v) || self.greater(v)
    }
}

/// A comparison operator as written in a version specifier.
///
/// Operators are a closed set, so code that reasons about pairs of
/// operators (see [`ConflictRule`](crate::ConflictRule)) can match exhaustively
/// instead of searching for substrings.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Debug,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `~=`
    #[strum(serialize = "~=")]
    Compatible,

    /// `==`
    #[strum(serialize = "==")]
    Equal,

    /// `===`
    #[strum(serialize = "===")]
    ArbitraryEqual,

    /// `!=`
    #[strum(serialize = "!=")]
    NotEqual,

    /// `<`
    #[strum(serialize = "<")]
    Less,

    /// `<=`
    #[strum(serialize = "<=")]
    LessOrEqual,

    /// `>`
    #[strum(serialize = ">")]
    Greater,

    /// `>=`
    #[strum(serialize = ">=")]
    GreaterOrEqual,
}

/// Parse a comparison operator, preferring the longest match.
pub(crate) fn operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::ArbitraryEqual, tag("===")),
        value(Operator::Equal, tag("==")),
        value(Operator::NotEqual, tag("!=")),
        value(Operator::Compatible, tag("~=")),
        value(Operator::LessOrEqual, tag("<=")),
        value(Operator::GreaterOrEqual, tag(">=")),
        value(Operator::Less, tag("<")),
        value(Operator::Greater, tag(">")),
    ))
    .parse(input)
}

/// A version constraint: an operator together with the version it compares against.
///
/// The generic parameter `V` is the constraint's version type.
/// Requirements keep the version as written (`Constraint<String>`) and convert
/// to [`Version`](crate::Version) when a strict comparison is needed:
///
/// ```
/// # use pyreq::{Constraint, Version};
/// let written = Constraint::GreaterOrEqual(String::from("1.0"));
/// let strict = written.map_ref(|v| Version::parse(v)).transpose().unwrap();
/// assert!(strict.matches(&Version::parse("1.2").unwrap()));
/// ```
///
/// ## Serialization
///
/// The serialized form is for transporting this type, not the pip syntax:
/// a tagged representation with `kind` and `value` fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, Assoc, new)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
#[func(const fn written(&self) -> &V)]
#[func(const fn op(&self) -> Operator)]
#[non_exhaustive]
pub enum Constraint<V> {
    /// Compatible release (`~=`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::Compatible)]
    #[new(into)]
    Compatible(V),

    /// Version matching (`==`), including `.*` prefix matching.
    #[assoc(written = &_0)]
    #[assoc(op = Operator::Equal)]
    #[new(into)]
    Equal(V),

    /// Arbitrary equality (`===`): the version text must match exactly.
    #[assoc(written = &_0)]
    #[assoc(op = Operator::ArbitraryEqual)]
    #[new(into)]
    ArbitraryEqual(V),

    /// Version exclusion (`!=`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::NotEqual)]
    #[new(into)]
    NotEqual(V),

    /// Exclusive upper bound (`<`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::Less)]
    #[new(into)]
    Less(V),

    /// Inclusive upper bound (`<=`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::LessOrEqual)]
    #[new(into)]
    LessOrEqual(V),

    /// Exclusive lower bound (`>`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::Greater)]
    #[new(into)]
    Greater(V),

    /// Inclusive lower bound (`>=`).
    #[assoc(written = &_0)]
    #[assoc(op = Operator::GreaterOrEqual)]
    #[new(into)]
    GreaterOrEqual(V),
}

impl<V> Constraint<V> {
    /// The version this constraint compares against.
    pub const fn version(&self) -> &V {
        self.written()
    }

    /// The operator this constraint applies.
    pub const fn operator(&self) -> Operator {
        self.op()
    }

    /// Build the constraint for `operator` applied to `version`.
    pub fn from_operator(operator: Operator, version: impl Into<V>) -> Self {
        let version = version.into();
        match operator {
            Operator::Compatible => Constraint::Compatible(version),
            Operator::Equal => Constraint::Equal(version),
            Operator::ArbitraryEqual => Constraint::ArbitraryEqual(version),
            Operator::NotEqual => Constraint::NotEqual(version),
            Operator::Less => Constraint::Less(version),
            Operator::LessOrEqual => Constraint::LessOrEqual(version),
            Operator::Greater => Constraint::Greater(version),
            Operator::GreaterOrEqual => Constraint::GreaterOrEqual(version),
        }
    }

    /// Evaluates whether a version satisfies this constraint.
    ///
    /// The constraint's version must implement `Comparable<T>` for the target type,
    /// so a constraint can be tested against a different version representation
    /// than the one it was written with.
    ///
    /// ```
    /// # use pyreq::{Constraint, Version};
    /// let constraint = Constraint::Less(Version::parse("2.0").unwrap());
    /// assert!(constraint.matches(&Version::parse("1.9.9").unwrap()));
    /// assert!(!constraint.matches(&Version::parse("2.0.0").unwrap()));
    /// ```
    pub fn matches<T>(&self, version: &T) -> bool
    where
        V: Comparable<T>,
    {
        match self {
            Constraint::Compatible(s) => s.compatible(version),
            Constraint::Equal(s) => s.equal(version),
            Constraint::ArbitraryEqual(s) => s.arbitrary_equal(version),
            Constraint::NotEqual(s) => s.not_equal(version),
            Constraint::Less(s) => s.less(version),
            Constraint::LessOrEqual(s) => s.less_or_equal(version),
            Constraint::Greater(s) => s.greater(version),
            Constraint::GreaterOrEqual(s) => s.greater_or_equal(version),
        }
    }

    /// Transforms the constraint's version by reference, preserving the operator.
    pub fn map_ref<'a, R, F: Fn(&'a V) -> R>(&'a self, closure: F) -> Constraint<R> {
        Constraint::from_operator(self.operator(), closure(self.version()))
    }

    /// Transforms the constraint's version by value, preserving the operator.
    pub fn map<R>(self, closure: impl Fn(V) -> R) -> Constraint<R> {
        let operator = self.operator();
        Constraint::from_operator(operator, closure(self.into_version()))
    }

    /// Unpack the version from the constraint.
    pub fn into_version(self) -> V {
        match self {
            Constraint::Compatible(v)
            | Constraint::Equal(v)
            | Constraint::ArbitraryEqual(v)
            | Constraint::NotEqual(v)
            | Constraint::Less(v)
            | Constraint::LessOrEqual(v)
            | Constraint::Greater(v)
            | Constraint::GreaterOrEqual(v) => v,
        }
    }
}

impl<V, E> Constraint<Result<V, E>> {
    /// Move a fallible conversion out of the constraint.
    pub fn transpose(self) -> Result<Constraint<V>, E> {
        let operator = self.operator();
        self.into_version()
            .map(|version| Constraint::from_operator(operator, version))
    }
}

impl<V: std::fmt::Display> std::fmt::Display for Constraint<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operator(), self.version())
    }
}

impl<V> AsRef<V> for Constraint<V> {
    fn as_ref(&self) -> &V {
        self.version()
    }
}

/// The specifiers attached to a single requirement, in the order written.
///
/// All constraints must match for a version to satisfy the requirement:
///
/// ```
/// # use pyreq::{Constraint, Constraints, Version};
/// let range = pyreq::constraints!(
///     { GreaterOrEqual => Version::parse("1.0").unwrap() },
///     { Less => Version::parse("2.0").unwrap() },
/// );
/// assert!(range.all_match(&Version::parse("1.5").unwrap()));
/// assert!(!range.all_match(&Version::parse("2.5").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Constraints<V>(Vec<Constraint<V>>);

impl<V> Constraints<V> {
    /// Iterate over constraints in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint<V>> {
        self.0.iter()
    }

    /// The number of constraints in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no constraints.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates if a version satisfies all constraints in the collection.
    pub fn all_match<T>(&self, version: &T) -> bool
    where
        V: Comparable<T>,
    {
        self.iter().all(|constraint| constraint.matches(version))
    }

    /// Evaluates if a version satisfies any constraint in the collection.
    pub fn any_match<T>(&self, version: &T) -> bool
    where
        V: Comparable<T>,
    {
        self.iter().any(|constraint| constraint.matches(version))
    }
}

impl<V> IntoIterator for Constraints<V> {
    type Item = Constraint<V>;
    type IntoIter = std::vec::IntoIter<Constraint<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Constraints<V> {
    type Item = &'a Constraint<V>;
    type IntoIter = std::slice::Iter<'a, Constraint<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<V> FromIterator<Constraint<V>> for Constraints<V> {
    fn from_iter<I: IntoIterator<Item = Constraint<V>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> From<Vec<Constraint<V>>> for Constraints<V> {
    fn from(constraints: Vec<Constraint<V>>) -> Self {
        Self(constraints)
    }
}

impl<V> From<Constraint<V>> for Constraints<V> {
    fn from(constraint: Constraint<V>) -> Self {
        Self(vec![constraint])
    }
}

impl<V: std::fmt::Display> std::fmt::Display for Constraints<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, constraint) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}

/// Construct a [`Constraint`] from a variant name and a version expression.
///
/// ```
/// # use pyreq::Constraint;
/// let constraint = pyreq::constraint!(Compatible => String::from("1.4.5"));
/// assert_eq!(constraint, Constraint::Compatible(String::from("1.4.5")));
/// ```
#[macro_export]
macro_rules! constraint {
    ($variant:ident => $($tail:tt)*) => {
        $crate::Constraint::$variant($($tail)*)
    };
}

/// Construct [`Constraints`] from a list of variant names and version expressions.
///
/// ```
/// # use pyreq::{Constraint, Constraints};
/// let constraints = pyreq::constraints!(
///     { Less => String::from("5") },
///     { GreaterOrEqual => String::from("4.25.3") },
/// );
/// let expected = Constraints::from(vec![
///     Constraint::Less(String::from("5")),
///     Constraint::GreaterOrEqual(String::from("4.25.3")),
/// ]);
/// assert_eq!(constraints, expected);
/// ```
#[macro_export]
macro_rules! constraints {
    ($({ $variant:ident => $($version:tt)* }),* $(,)?) => {
        $crate::Constraints::from(vec![
            $(
                $crate::Constraint::$variant($($version)*)
            ),*
        ])
    };
}
