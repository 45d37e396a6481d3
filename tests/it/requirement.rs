//! Tests for requirement parsing on lines seen in real requirement files.

use assert_matches::assert_matches;
use simple_test_case::test_case;

use pyreq::{Operator, Requirement, RequirementError, VersionOrUrl, parse_requirement};

#[test_case("opencv-contrib-python-headless>=4.8.0.74", "opencv-contrib-python-headless", &[(Operator::GreaterOrEqual, "4.8.0.74")]; "long_name")]
#[test_case("transformers>=4.25.1,!=4.31.*", "transformers", &[(Operator::GreaterOrEqual, "4.25.1"), (Operator::NotEqual, "4.31.*")]; "excluded_series")]
#[test_case("torchsde ~= 0.2.5", "torchsde", &[(Operator::Compatible, "0.2.5")]; "spaced_compatible")]
#[test_case("accelerate (>=0.20.3)", "accelerate", &[(Operator::GreaterOrEqual, "0.20.3")]; "parenthesized")]
#[test_case("Pillow", "Pillow", &[]; "case_preserved")]
#[test_case("kornia>=0.7.1; python_version >= \"3.8\"", "kornia", &[(Operator::GreaterOrEqual, "0.7.1")]; "with_marker")]
#[test]
fn real_world(input: &str, name: &str, specifiers: &[(Operator, &str)]) {
    let requirement = parse_requirement(input).expect("must parse requirement");
    pretty_assertions::assert_eq!(requirement.name(), name);

    let parsed = requirement
        .constraints()
        .map(|constraints| {
            constraints
                .iter()
                .map(|constraint| (constraint.operator(), constraint.version().as_str()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    pretty_assertions::assert_eq!(parsed, specifiers);
}

#[test]
fn direct_reference_keeps_url() {
    let requirement: Requirement =
        "insightface @ https://github.com/Gourieff/Assets/raw/main/Insightface/insightface-0.7.3-cp310-cp310-win_amd64.whl ; sys_platform == 'win32'"
            .parse()
            .expect("must parse requirement");

    assert_matches!(requirement.version_or_url(), Some(VersionOrUrl::Url(url)) if url.ends_with("win_amd64.whl"));
    assert!(requirement.marker().is_some());
    pretty_assertions::assert_eq!(requirement.package_name().as_str(), "insightface");
}

#[test]
fn errors_carry_input_and_offset() {
    let err = Requirement::parse("numpy>=1.0 extra-junk").expect_err("must fail");
    assert_matches!(
        err,
        RequirementError::Syntax { input, offset: 11, .. } if input == "numpy>=1.0 extra-junk"
    );
}

#[test]
fn serde_roundtrip() {
    let requirement =
        Requirement::parse("diffusers[torch,training]>=0.21; python_version >= '3.8'").expect("must parse");
    let serialized = serde_json::to_string(&requirement).expect("must serialize");
    let deserialized: Requirement = serde_json::from_str(&serialized).expect("must deserialize");
    pretty_assertions::assert_eq!(requirement, deserialized);
}
