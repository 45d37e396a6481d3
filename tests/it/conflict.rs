//! Tests for conflict detection across components.

use itertools::iproduct;
use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;

use pyreq::{Component, ConflictDetector, ConflictRule, Operator, find_conflicts};

#[test]
fn disjoint_ranges_are_flagged() {
    let analysis = ConflictDetector::detect(&[
        Component::new("a", ["pkg>=2.0"]),
        Component::new("b", ["pkg<1.0"]),
    ]);
    assert_eq!(analysis.packages(), &["pkg"]);
    assert_eq!(find_conflicts(&["pkg>=2.0", "pkg<1.0"]), vec!["pkg"]);
}

#[test]
fn identical_pins_are_not_flagged() {
    let analysis = ConflictDetector::detect(&[
        Component::new("a", ["pkg==1.0.0"]),
        Component::new("b", ["pkg==1.0.0"]),
    ]);
    assert!(analysis.is_empty());
}

#[test]
fn operator_matrix_coverage() {
    let checked = iproduct!(Operator::iter(), Operator::iter())
        .filter(|(left, right)| ConflictRule::for_operators(*left, *right).is_some())
        .map(|(left, right)| format!("{left} {right}"))
        .collect::<Vec<_>>();

    assert_eq!(
        checked,
        vec![
            "~= ==", "~= ===", "== ==", "=== ===", "!= ==", "< ~=", "< ==", "<= ~=", "<= ==",
            "> ~=", "> ==", "> <", "> <=", ">= ~=", ">= ==", ">= <", ">= <=",
        ]
    );
}

#[test]
fn operator_matrix_is_not_symmetric() {
    for (left, right) in iproduct!(Operator::iter(), Operator::iter()) {
        if left == right {
            continue;
        }
        let forward = ConflictRule::for_operators(left, right);
        let backward = ConflictRule::for_operators(right, left);
        assert!(
            forward.is_none() || backward.is_none(),
            "{left} vs {right} is checked in both directions"
        );
    }
}

#[test]
fn compatible_pairs_are_left_unchecked() {
    assert_eq!(ConflictRule::for_operators(Operator::Compatible, Operator::Compatible), None);
    assert_eq!(ConflictRule::for_operators(Operator::NotEqual, Operator::Compatible), None);
    assert_eq!(ConflictRule::for_operators(Operator::Compatible, Operator::NotEqual), None);
}

#[test]
fn every_pair_of_bounds_in_both_orders() {
    let declarations = ["pkg>=2.0", "pkg>2.0", "pkg<=1.0", "pkg<1.0", "pkg==1.5"];
    for (left, right) in iproduct!(declarations, declarations) {
        if left == right {
            continue;
        }
        let forward = find_conflicts(&[left, right]);
        let backward = find_conflicts(&[right, left]);
        assert_eq!(forward, backward, "{left} vs {right} depends on order");
    }
}
