//! # PEP 440 Specifiers
//!
//! Parses bare specifier lists such as `>= 1.0, < 2.0, != 1.3.5` into
//! [`Constraints<Version>`], and evaluates specifiers written against strings
//! that may or may not be PEP 440 versions.
//!
//! ## References
//!
//! - [PEP 440 - Version Identification](https://peps.python.org/pep-0440/)
//! - [Version Specifiers](https://packaging.python.org/en/latest/specifications/version-specifiers/)

use nom::{
    Finish, IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{eof, map_res},
    multi::separated_list1,
    sequence::{delimited, pair, terminated},
};

use super::{Constraint, Constraints, fallback::LooseVersion, operator};
use crate::{Error, Version, VersionError};

/// Characters that may appear in a version token.
pub(crate) fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '-' | '_')
}

/// Parse a pip specifier list into [`Constraints`].
///
/// ```
/// # use pyreq::{Version, constraint::pep440};
/// let constraints = pep440::parse(">= 1.0, < 2.0").unwrap();
/// assert!(constraints.all_match(&Version::parse("1.5").unwrap()));
/// ```
#[tracing::instrument]
pub fn parse(input: &str) -> Result<Constraints<Version>, Error> {
    fn single(input: &str) -> IResult<&str, Constraint<Version>> {
        let (input, (op, version)) = pair(
            delimited(multispace0, operator, multispace0),
            map_res(take_while1(is_version_char), Version::parse),
        )
        .parse(input)?;
        Ok((input, Constraint::from_operator(op, version)))
    }

    fn constraints(input: &str) -> IResult<&str, Vec<Constraint<Version>>> {
        terminated(
            separated_list1(delimited(multispace0, char(','), multispace0), single),
            eof,
        )
        .parse(input)
    }

    constraints(input.trim())
        .finish()
        .map(|(_, parsed)| Constraints::from(parsed))
        .map_err(|e| {
            VersionError::InvalidSpecifiers {
                specifiers: input.to_string(),
                message: format!("{} at '{}'", e.code.description(), e.input),
            }
            .into()
        })
}

/// Check an installed version string against a specifier written as text.
///
/// When both sides are PEP 440 versions the strict rules apply.
/// Otherwise both sides are compared with the lenient dotted comparator,
/// so build dates and vendor suffixes still order sensibly.
///
/// ```
/// # use pyreq::{Constraint, constraint::pep440::satisfied_by};
/// assert!(satisfied_by(&Constraint::Less(String::from("2.0")), "1.9.9"));
/// assert!(satisfied_by(&Constraint::GreaterOrEqual(String::from("2023.10.01")), "2024.01.15-nightly7"));
/// ```
pub fn satisfied_by(constraint: &Constraint<String>, installed: &str) -> bool {
    match (Version::parse(constraint.version()), Version::parse(installed)) {
        (Ok(version), Ok(target)) => constraint.map_ref(|_| version.clone()).matches(&target),
        _ => constraint
            .map_ref(|v| LooseVersion::from(v.as_str()))
            .matches(&LooseVersion::from(installed)),
    }
}
