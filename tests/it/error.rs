use assert_matches::assert_matches;
use color_eyre::{Result, eyre::Context};
use pretty_assertions::assert_eq;

use pyreq::{Error, Requirement, RequirementError, Version, VersionError, constraint::pep440};

#[test]
fn error_wrappable_context() -> Result<()> {
    let version = Version::parse("1.0.0").context("can wrap")?;
    assert_eq!(version, Version::parse("1.0")?);

    let requirement = Requirement::parse("pkg>=1.0").context("can wrap")?;
    assert_eq!(requirement.name(), "pkg");

    let constraints = pep440::parse(">=1.0, <2.0").context("can wrap")?;
    assert_eq!(constraints.len(), 2);

    Ok(())
}

#[test]
fn error_wrappable_withcontext() -> Result<()> {
    let version = Version::parse("2!1.0").with_context(|| "can wrap")?;
    assert_eq!(version.epoch(), 2);

    let err = Version::parse("not-a-version").with_context(|| "can wrap");
    assert!(err.is_err());

    Ok(())
}

#[test]
fn converts_into_crate_error() {
    let err: Error = Version::parse("1.0garbage").expect_err("must fail").into();
    assert_matches!(err, Error::Version(VersionError::InvalidVersion { .. }));

    let err: Error = Requirement::parse("pkg>=").expect_err("must fail").into();
    assert_matches!(err, Error::Requirement(RequirementError::Syntax { .. }));

    let err = pep440::parse(">= 1.0,").expect_err("must fail");
    assert_matches!(err, Error::Version(VersionError::InvalidSpecifiers { .. }));
}

#[test]
fn messages_name_the_input() {
    let err = Requirement::parse("pkg; gpu == 'x'").expect_err("must fail");
    assert_matches!(&err, RequirementError::UnknownMarkerVariable { variable, .. } if variable == "gpu");
    assert!(err.to_string().contains("gpu"), "{err}");
}
