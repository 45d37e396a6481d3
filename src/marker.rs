//! # Environment Markers
//!
//! A marker is the boolean expression after `;` in a PEP 508 requirement,
//! e.g. `sys_platform == "win32" and python_version >= "3.8"`.
//! Markers are parsed into a [`MarkerTree`] along with the requirement and
//! evaluated later against a [`MarkerEnvironment`].
//!
//! ## Evaluation
//!
//! - Both sides of a comparison are lower-cased.
//! - When both sides parse as PEP 440 versions the comparison uses version rules,
//!   otherwise plain string rules apply (`sys_platform == "win32"` is not a version).
//! - `in` and `not in` treat the right side as a comma separated set of values.
//! - `and` and `or` short-circuit.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{Constraint, MarkerEnvironment, Operator, Version};

/// A variable an environment marker may reference.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarkerVariable {
    /// `python_version`
    PythonVersion,
    /// `python_full_version`
    PythonFullVersion,
    /// `sys_platform`
    SysPlatform,
    /// `os_name`
    OsName,
    /// `platform_machine`
    PlatformMachine,
    /// `platform_system`
    PlatformSystem,
    /// `platform_release`
    PlatformRelease,
    /// `platform_version`
    PlatformVersion,
    /// `platform_python_implementation`
    PlatformPythonImplementation,
    /// `implementation_name`
    ImplementationName,
    /// `implementation_version`
    ImplementationVersion,
    /// `extra`
    Extra,
}

impl MarkerVariable {
    /// Resolve a variable by name, including the legacy dotted spellings
    /// (`os.name`, `sys.platform`, `platform.version`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "python_version" => Self::PythonVersion,
            "python_full_version" => Self::PythonFullVersion,
            "sys_platform" | "sys.platform" => Self::SysPlatform,
            "os_name" | "os.name" => Self::OsName,
            "platform_machine" | "platform.machine" => Self::PlatformMachine,
            "platform_system" => Self::PlatformSystem,
            "platform_release" => Self::PlatformRelease,
            "platform_version" | "platform.version" => Self::PlatformVersion,
            "platform_python_implementation"
            | "platform.python_implementation"
            | "python_implementation" => Self::PlatformPythonImplementation,
            "implementation_name" => Self::ImplementationName,
            "implementation_version" => Self::ImplementationVersion,
            "extra" => Self::Extra,
            _ => return None,
        })
    }
}

/// One side of a marker comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum MarkerValue {
    /// An environment variable, resolved at evaluation time.
    Variable(MarkerVariable),

    /// A quoted string, or a bare token starting with a digit.
    Literal(String),
}

impl MarkerValue {
    fn resolve(&self, env: &MarkerEnvironment) -> String {
        match self {
            MarkerValue::Variable(variable) => env.get(*variable).to_lowercase(),
            MarkerValue::Literal(literal) => literal.to_lowercase(),
        }
    }
}

/// The operator of a marker comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerOperator {
    /// A version comparison operator.
    Compare(Operator),

    /// `in`
    In,

    /// `not in`
    NotIn,
}

/// A single `left op right` comparison.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerExpression {
    /// The left operand.
    pub left: MarkerValue,

    /// The comparison operator.
    pub operator: MarkerOperator,

    /// The right operand.
    pub right: MarkerValue,
}

impl MarkerExpression {
    /// Evaluate the comparison against an environment.
    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        let left = self.left.resolve(env);
        let right = self.right.resolve(env);

        match self.operator {
            MarkerOperator::In => contains(&right, &left),
            MarkerOperator::NotIn => !contains(&right, &left),
            MarkerOperator::Compare(operator) => {
                match (Version::parse(&left), Version::parse(&right)) {
                    (Ok(target), Ok(version)) => {
                        Constraint::<Version>::from_operator(operator, version).matches(&target)
                    }
                    _ => Constraint::<String>::from_operator(operator, right).matches(&left),
                }
            }
        }
    }
}

fn contains(set: &str, value: &str) -> bool {
    set.split(',').map(str::trim).any(|member| member == value)
}

/// A parsed marker expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerTree {
    /// Both sides must hold.
    And(Box<MarkerTree>, Box<MarkerTree>),

    /// Either side must hold.
    Or(Box<MarkerTree>, Box<MarkerTree>),

    /// A leaf comparison.
    Expression(MarkerExpression),
}

impl MarkerTree {
    /// Evaluate the tree against an environment.
    pub fn evaluate(&self, env: &MarkerEnvironment) -> bool {
        match self {
            MarkerTree::And(left, right) => left.evaluate(env) && right.evaluate(env),
            MarkerTree::Or(left, right) => left.evaluate(env) || right.evaluate(env),
            MarkerTree::Expression(expression) => expression.evaluate(env),
        }
    }
}

/// Evaluate an optional marker; a requirement without a marker always applies.
pub fn evaluate_marker(marker: Option<&MarkerTree>, env: &MarkerEnvironment) -> bool {
    marker.is_none_or(|marker| marker.evaluate(env))
}

impl std::fmt::Display for MarkerValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerValue::Variable(variable) => write!(f, "{variable}"),
            MarkerValue::Literal(literal) if literal.contains('"') => write!(f, "'{literal}'"),
            MarkerValue::Literal(literal) => write!(f, "\"{literal}\""),
        }
    }
}

impl std::fmt::Display for MarkerOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerOperator::Compare(operator) => write!(f, "{operator}"),
            MarkerOperator::In => f.write_str("in"),
            MarkerOperator::NotIn => f.write_str("not in"),
        }
    }
}

impl std::fmt::Display for MarkerExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator, self.right)
    }
}

impl std::fmt::Display for MarkerTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerTree::Expression(expression) => write!(f, "{expression}"),
            MarkerTree::Or(left, right) => write!(f, "{left} or {right}"),
            MarkerTree::And(left, right) => {
                for (i, side) in [left, right].into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and ")?;
                    }
                    match side.as_ref() {
                        MarkerTree::Or(..) => write!(f, "({side})")?,
                        _ => write!(f, "{side}")?,
                    }
                }
                Ok(())
            }
        }
    }
}
