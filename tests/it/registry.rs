//! Tests for the installed-package registry and install planning.

use simple_test_case::test_case;

use pyreq::{
    ComponentManifest, InstallPlanner, InstalledPackage, InstallerBackend, MarkerEnvironment,
    Normalizer, PackageRegistry,
};

fn registry() -> PackageRegistry {
    PackageRegistry::default()
        .with_package("torch", InstalledPackage::new("2.1.2+cu118").with_requires(["filelock", "sympy"]))
        .with_package("numpy", InstalledPackage::new("1.26.4"))
        .with_package("opencv-python", InstalledPackage::new("4.9.0.80").with_requires(["numpy>=1.21.2"]))
        .with_package("xformers", InstalledPackage::new("0.0.23.post1"))
}

#[test_case("torch>=2.1", true; "local_version_above_bound")]
#[test_case("torch==2.1.2", true; "public_pin_ignores_local_label")]
#[test_case("torch==2.1.2+cu121", false; "different_local_label")]
#[test_case("xformers>=0.0.23", true; "post_release")]
#[test_case("Opencv_Python>=4.8", true; "normalized_lookup")]
#[test]
fn satisfied(requirement: &str, expected: bool) {
    pretty_assertions::assert_eq!(registry().is_satisfied(requirement), expected, "{requirement}");
}

#[test]
fn dependencies_are_satisfied_transitively() {
    let registry = registry();
    let requires = registry.requires("opencv-python").expect("must be installed");
    assert!(registry.unsatisfied(requires).is_empty());

    let requires = registry.requires("torch").expect("must be installed");
    pretty_assertions::assert_eq!(registry.unsatisfied(requires), vec!["filelock", "sympy"]);
}

#[test_case(InstallerBackend::Pip, "venv/bin/python -m pip install -r nodes/b/requirements.txt"; "pip")]
#[test_case(InstallerBackend::Uv, "uv pip install -r nodes/b/requirements.txt --python venv/bin/python"; "uv")]
#[test]
fn planner_uses_selected_backend(backend: InstallerBackend, expected: &str) {
    let planner = InstallPlanner::builder()
        .backend(backend)
        .registry(registry())
        .normalizer(
            Normalizer::builder()
                .environment(MarkerEnvironment::from_host("3.10.12"))
                .build(),
        )
        .build();

    let steps = planner.plan(
        "venv/bin/python",
        &[
            ComponentManifest::new("a", "nodes/a/requirements.txt", ["torch", "numpy<2"]),
            ComponentManifest::new("b", "nodes/b/requirements.txt", ["torch", "einops"]),
        ],
    );

    pretty_assertions::assert_eq!(steps.len(), 1);
    pretty_assertions::assert_eq!(steps[0].missing(), &["einops"]);
    pretty_assertions::assert_eq!(steps[0].command().to_string(), expected);
}
