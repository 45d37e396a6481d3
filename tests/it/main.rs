//! Tests for the crate.

use simple_test_case::test_case;
use static_assertions::const_assert;

use pyreq::*;

mod conflict;
mod error;
mod marker;
mod normalize;
mod registry;
mod requirement;
mod version;

const_assert!(impls::impls!(Version: Send & Sync & Clone));
const_assert!(impls::impls!(Requirement: Send & Sync & Clone));
const_assert!(impls::impls!(MarkerEnvironment: Send & Sync));
const_assert!(impls::impls!(Normalizer: Send & Sync));
const_assert!(impls::impls!(PackageRegistry: Send & Sync));
const_assert!(impls::impls!(ConflictAnalysis: Send & Sync));
const_assert!(impls::impls!(Error: Send & Sync & std::error::Error));

#[test_case(r#""pip""#, InstallerBackend::Pip; "pip")]
#[test_case(r#""uv""#, InstallerBackend::Uv; "uv")]
#[test]
fn deserializes_backend(input: &str, expected: InstallerBackend) {
    let backend: InstallerBackend = serde_json::from_str(input).expect("must deserialize");
    assert_eq!(expected, backend);
}

#[test_case(PackageName::from("torch"); "torch")]
#[test_case(PackageName::from("Foo_Bar.baz"); "mixed_separators")]
#[test_case(PackageName::from("SAM-2"); "uppercase")]
#[test]
fn package_name_roundtrip(name: PackageName) {
    let serialized = serde_json::to_string(&name).expect("must serialize");
    let deserialized = serde_json::from_str(&serialized).expect("must deserialize");
    assert_eq!(name, deserialized);
}

#[test]
fn environment_from_config() {
    let env: MarkerEnvironment = serde_json::from_str(
        r#"{
            "python_version": "3.10",
            "python_full_version": "3.10.12",
            "sys_platform": "win32",
            "os_name": "nt",
            "platform_machine": "AMD64",
            "platform_system": "Windows"
        }"#,
    )
    .expect("must deserialize");

    let normalizer = Normalizer::builder().environment(env).build();
    assert_eq!(
        normalizer.normalize([
            "pywin32; os_name == 'nt'",
            "triton; platform_system == 'Linux'",
            "torch; platform_machine == 'amd64' and python_version >= '3.8'",
        ]),
        vec!["pywin32", "torch"]
    );
}
