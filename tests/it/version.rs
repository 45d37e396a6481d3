//! Tests for version ordering and matching.

use std::cmp::Ordering;

use proptest::prelude::*;
use simple_test_case::test_case;

use pyreq::{Constraint, Version, compare, constraint::fallback::compare_loose, constraint::pep440};

fn v(input: &str) -> Version {
    Version::parse(input).expect("must parse version")
}

prop_compose! {
    fn version_text()(
        epoch in prop::option::weighted(0.1, 1u64..3),
        release in prop::collection::vec(0u64..12, 1..4),
        pre in prop::option::of((prop::sample::select(vec!["a", "b", "rc"]), 0u64..3)),
        post in prop::option::of(0u64..3),
        dev in prop::option::of(0u64..3),
        local in prop::option::of(prop::sample::select(vec!["cu118", "1", "ubuntu.2", "3.abc"])),
    ) -> String {
        let mut text = String::new();
        if let Some(epoch) = epoch {
            text.push_str(&format!("{epoch}!"));
        }
        text.push_str(&release.iter().map(u64::to_string).collect::<Vec<_>>().join("."));
        if let Some((label, n)) = pre {
            text.push_str(&format!("{label}{n}"));
        }
        if let Some(n) = post {
            text.push_str(&format!(".post{n}"));
        }
        if let Some(n) = dev {
            text.push_str(&format!(".dev{n}"));
        }
        if let Some(local) = local {
            text.push_str(&format!("+{local}"));
        }
        text
    }
}

proptest! {
    #[test]
    fn compare_is_reflexive(text in version_text()) {
        let version = v(&text);
        prop_assert_eq!(compare(&version, &version), Ordering::Equal);
    }

    #[test]
    fn compare_is_antisymmetric(a in version_text(), b in version_text()) {
        let (a, b) = (v(&a), v(&b));
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn compare_is_transitive(a in version_text(), b in version_text(), c in version_text()) {
        let (a, b, c) = (v(&a), v(&b), v(&c));
        if compare(&a, &b).is_le() && compare(&b, &c).is_le() {
            prop_assert!(compare(&a, &c).is_le());
        }
        if compare(&a, &b).is_ge() && compare(&b, &c).is_ge() {
            prop_assert!(compare(&a, &c).is_ge());
        }
    }

    #[test]
    fn display_parses_back_equal(text in version_text()) {
        let version = v(&text);
        let reparsed = v(&version.to_string());
        prop_assert_eq!(compare(&version, &reparsed), Ordering::Equal);
    }

    #[test]
    fn loose_compare_never_panics(a in "[0-9a-z._+-]{0,16}", b in "[0-9a-z._+-]{0,16}") {
        prop_assert_eq!(compare_loose(&a, &b), compare_loose(&b, &a).reverse());
    }
}

#[test]
fn pre_release_sorts_below_final() {
    assert!(v("1.0a1") < v("1.0"));
    assert!(!(v("1.0") < v("1.0a1")));
}

#[test]
fn trailing_zeros_are_equal() {
    pretty_assertions::assert_eq!(compare(&v("1.0.0"), &v("1.0")), Ordering::Equal);
}

#[test_case("1.0*", "1.0a1", true; "wildcard_matches_pre_release")]
#[test_case("0.9*", "1.0", false; "wildcard_different_major")]
#[test_case("2.2", "2.9", true; "minor_above")]
#[test_case("2.2", "3.0", false; "next_major")]
#[test_case("1.4.5", "1.4.9", true; "patch_above")]
#[test_case("1.4.5", "1.5.0", false; "next_minor")]
#[test]
fn compatible_release(spec: &str, target: &str, expected: bool) {
    pretty_assertions::assert_eq!(
        v(spec).compatible_with(&v(target)),
        expected,
        "{target} compatible with ~={spec}"
    );
}

#[test_case(">=1.0,<2.0", "1.5", true; "inside_range")]
#[test_case(">=1.0,<2.0", "2.0", false; "upper_bound_exclusive")]
#[test_case("==1.4.*", "1.4.7", true; "prefix_match")]
#[test_case("!=1.4.*", "1.4.7", false; "prefix_exclusion")]
#[test_case("~=2.2.0", "2.2.5", true; "compatible_patch")]
#[test_case("===1.0+LOCAL", "1.0+local", true; "arbitrary_equal_case_insensitive")]
#[test_case(">1.0.post1", "1.0.post2", true; "post_release")]
#[test_case("<1.0", "1.0.dev0", true; "dev_release")]
#[test]
fn specifier_list(specifiers: &str, target: &str, expected: bool) {
    let constraints = pep440::parse(specifiers).expect("must parse specifiers");
    pretty_assertions::assert_eq!(constraints.all_match(&v(target)), expected, "{target} in {constraints}");
}

#[test_case(Constraint::GreaterOrEqual(String::from("2023.10.01")), "2024.01.15-nightly7", true; "build_date")]
#[test_case(Constraint::Less(String::from("1.10")), "1.9_build7", true; "numeric_segments")]
#[test_case(Constraint::Equal(String::from("1.0")), "1.0.0", true; "strict_when_both_parse")]
#[test]
fn installed_version_checks(constraint: Constraint<String>, installed: &str, expected: bool) {
    pretty_assertions::assert_eq!(pep440::satisfied_by(&constraint, installed), expected);
}
