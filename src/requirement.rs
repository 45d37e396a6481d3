//! # PEP 508 Requirements
//!
//! Parses dependency specifications as written in `requirements.txt` files
//! and package metadata:
//!
//! ```text
//! requirement   := identifier extras? (url_ref | version_spec)? (';' marker)?
//! identifier    := [A-Za-z0-9._-]+
//! extras        := '[' identifier (',' identifier)* ']'
//! url_ref       := '@' url_token
//! version_spec  := '(' version_list ')' | version_list
//! version_list  := version_one (',' version_one)*
//! version_one   := cmp_op version_token
//! marker        := marker_and ('or' marker_and)*
//! marker_and    := marker_expr ('and' marker_expr)*
//! marker_expr   := '(' marker ')' | marker_var marker_op marker_var
//! marker_op     := cmp_op | 'in' | 'not in'
//! ```
//!
//! Markers nest arbitrarily, so the parser is recursive descent built from `nom`
//! combinators. Once the parser has committed to a construct (an operator, an open
//! bracket, the `;` before a marker) a failure inside it is reported at that
//! position instead of backtracking.

use std::{collections::BTreeSet, str::FromStr};

use getset::Getters;
use nom::{
    Finish, IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_till1, take_while1},
    character::complete::{char, multispace0, multispace1, satisfy},
    combinator::{cut, map, not, opt, value},
    error::ErrorKind,
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated},
};
use serde::{Deserialize, Serialize};

use crate::{
    Constraint, Constraints, MarkerEnvironment, MarkerExpression, MarkerOperator, MarkerTree,
    MarkerValue, MarkerVariable, PackageName, RequirementError,
    constraint::{operator, pep440::is_version_char},
    error::syntax,
};

/// A parsed PEP 508 requirement.
///
/// ```
/// # use pyreq::Requirement;
/// let requirement = Requirement::parse("diffusers[torch] (>=0.10, <1) ; python_version >= '3.8'").unwrap();
/// assert_eq!(requirement.name(), "diffusers");
/// assert_eq!(requirement.to_string(), r#"diffusers[torch]>=0.10,<1 ; python_version >= "3.8""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Getters, Serialize, Deserialize)]
#[getset(get = "pub")]
pub struct Requirement {
    /// The distribution name, as written.
    name: String,

    /// Requested extras, e.g. `torch` in `diffusers[torch]`.
    extras: BTreeSet<String>,

    /// Either the version specifiers or a direct URL.
    version_or_url: Option<VersionOrUrl>,

    /// The environment marker gating this requirement.
    marker: Option<MarkerTree>,
}

/// The version part of a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrUrl {
    /// Version specifiers, with versions kept as written.
    Specifiers(Constraints<String>),

    /// A direct reference (`name @ url`).
    Url(String),
}

impl Requirement {
    /// Parse a requirement string.
    #[tracing::instrument]
    pub fn parse(input: &str) -> Result<Self, RequirementError> {
        match requirement(input).finish() {
            Ok(("", requirement)) => Ok(requirement),
            Ok((remaining, _)) => Err(syntax!(input, remaining, "unexpected trailing input")),
            Err(e) if e.code == ErrorKind::Verify => Err(RequirementError::UnknownMarkerVariable {
                input: input.to_string(),
                variable: e.input.chars().take_while(|c| is_token_char(*c)).collect(),
            }),
            Err(e) => Err(syntax!(input, e.input, e.code.description())),
        }
    }

    /// The normalized distribution name.
    pub fn package_name(&self) -> PackageName {
        PackageName::new(&self.name)
    }

    /// The version specifiers, if the requirement has any.
    pub fn constraints(&self) -> Option<&Constraints<String>> {
        match &self.version_or_url {
            Some(VersionOrUrl::Specifiers(constraints)) => Some(constraints),
            _ => None,
        }
    }

    /// The direct reference URL, if the requirement is in URL form.
    pub fn url(&self) -> Option<&str> {
        match &self.version_or_url {
            Some(VersionOrUrl::Url(url)) => Some(url),
            _ => None,
        }
    }

    /// Whether this requirement applies in the given environment.
    pub fn evaluate_marker(&self, env: &MarkerEnvironment) -> bool {
        crate::evaluate_marker(self.marker.as_ref(), env)
    }
}

/// Parse a requirement string; equivalent to [`Requirement::parse`].
pub fn parse_requirement(input: &str) -> Result<Requirement, RequirementError> {
    Requirement::parse(input)
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            let extras = self.extras.iter().map(String::as_str).collect::<Vec<_>>();
            write!(f, "[{}]", extras.join(","))?;
        }
        match &self.version_or_url {
            Some(VersionOrUrl::Specifiers(constraints)) => write!(f, "{constraints}")?,
            Some(VersionOrUrl::Url(url)) => write!(f, " @ {url}")?,
            None => {}
        }
        if let Some(marker) = &self.marker {
            write!(f, " ; {marker}")?;
        }
        Ok(())
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

// Bare marker tokens: variable names (including dotted legacy names) and unquoted numbers.
fn is_token_char(c: char) -> bool {
    is_identifier_char(c) || c == '*'
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_token_char)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_identifier_char).parse(input)
}

fn extras(input: &str) -> IResult<&str, BTreeSet<String>> {
    let names = map(
        separated_list0(ws(char(',')), ws(identifier)),
        |names: Vec<&str>| names.into_iter().map(str::to_string).collect::<BTreeSet<_>>(),
    );
    preceded(char('['), cut(terminated(names, char(']')))).parse(input)
}

fn url_ref(input: &str) -> IResult<&str, String> {
    let url = take_till1(|c: char| c.is_whitespace() || c == ';');
    map(preceded(char('@'), cut(preceded(multispace0, url))), str::to_string).parse(input)
}

fn version_one(input: &str) -> IResult<&str, Constraint<String>> {
    let (input, op) = operator(input)?;
    let (input, version) = cut(preceded(multispace0, take_while1(is_version_char))).parse(input)?;
    Ok((input, Constraint::from_operator(op, version)))
}

fn version_list(input: &str) -> IResult<&str, Constraints<String>> {
    map(separated_list1(ws(char(',')), version_one), Constraints::from).parse(input)
}

fn version_spec(input: &str) -> IResult<&str, Constraints<String>> {
    alt((
        preceded(char('('), cut(terminated(ws(version_list), char(')')))),
        version_list,
    ))
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        preceded(char('"'), cut(terminated(take_till(|c: char| c == '"'), char('"')))),
        preceded(char('\''), cut(terminated(take_till(|c: char| c == '\''), char('\'')))),
    ))
    .parse(input)
}

fn bare_value(input: &str) -> IResult<&str, MarkerValue> {
    let (rest, token) = take_while1(is_token_char).parse(input)?;
    if token.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok((rest, MarkerValue::Literal(token.to_string())));
    }

    match MarkerVariable::from_name(token) {
        Some(variable) => Ok((rest, MarkerValue::Variable(variable))),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            ErrorKind::Verify,
        ))),
    }
}

fn marker_value(input: &str) -> IResult<&str, MarkerValue> {
    alt((
        map(quoted, |literal| MarkerValue::Literal(literal.to_string())),
        bare_value,
    ))
    .parse(input)
}

fn marker_operator(input: &str) -> IResult<&str, MarkerOperator> {
    alt((
        map(operator, MarkerOperator::Compare),
        value(
            MarkerOperator::NotIn,
            (tag("not"), multispace1, keyword("in")),
        ),
        value(MarkerOperator::In, keyword("in")),
    ))
    .parse(input)
}

fn marker_expression(input: &str) -> IResult<&str, MarkerExpression> {
    let (input, left) = marker_value(input)?;
    let (input, operator) = cut(ws(marker_operator)).parse(input)?;
    let (input, right) = cut(marker_value).parse(input)?;
    Ok((
        input,
        MarkerExpression {
            left,
            operator,
            right,
        },
    ))
}

fn marker_atom(input: &str) -> IResult<&str, MarkerTree> {
    alt((
        preceded(ws(char('(')), cut(terminated(ws(marker_or), char(')')))),
        map(marker_expression, MarkerTree::Expression),
    ))
    .parse(input)
}

fn marker_and(input: &str) -> IResult<&str, MarkerTree> {
    let (input, first) = marker_atom(input)?;
    let (input, rest) = many0(preceded(ws(keyword("and")), cut(marker_atom))).parse(input)?;
    let tree = rest.into_iter().fold(first, |left, right| {
        MarkerTree::And(Box::new(left), Box::new(right))
    });
    Ok((input, tree))
}

fn marker_or(input: &str) -> IResult<&str, MarkerTree> {
    let (input, first) = marker_and(input)?;
    let (input, rest) = many0(preceded(ws(keyword("or")), cut(marker_and))).parse(input)?;
    let tree = rest.into_iter().fold(first, |left, right| {
        MarkerTree::Or(Box::new(left), Box::new(right))
    });
    Ok((input, tree))
}

fn requirement(input: &str) -> IResult<&str, Requirement> {
    let (input, name) = preceded(multispace0, identifier).parse(input)?;
    let (input, extras) = opt(preceded(multispace0, extras)).parse(input)?;
    let (input, version_or_url) = opt(preceded(
        multispace0,
        alt((
            map(url_ref, VersionOrUrl::Url),
            map(version_spec, VersionOrUrl::Specifiers),
        )),
    ))
    .parse(input)?;
    let (input, marker) = opt(preceded(ws(char(';')), cut(marker_or))).parse(input)?;
    let (input, _) = multispace0(input)?;

    Ok((
        input,
        Requirement {
            name: name.to_string(),
            extras: extras.unwrap_or_default(),
            version_or_url,
            marker,
        },
    ))
}
