//! Tests for marker evaluation against described environments.

use simple_test_case::test_case;

use pyreq::{MarkerEnvironment, MarkerTree, Requirement, evaluate_marker};

fn windows() -> MarkerEnvironment {
    MarkerEnvironment::builder()
        .python_version("3.11")
        .python_full_version("3.11.9")
        .sys_platform("win32")
        .os_name("nt")
        .platform_machine("AMD64")
        .platform_system("Windows")
        .platform_python_implementation("CPython")
        .implementation_name("cpython")
        .implementation_version("3.11.9")
        .build()
}

fn macos() -> MarkerEnvironment {
    MarkerEnvironment::builder()
        .python_version("3.9")
        .python_full_version("3.9.18")
        .sys_platform("darwin")
        .os_name("posix")
        .platform_machine("arm64")
        .platform_system("Darwin")
        .platform_release("23.4.0")
        .platform_python_implementation("CPython")
        .implementation_name("cpython")
        .build()
}

fn marker(input: &str) -> MarkerTree {
    let requirement = Requirement::parse(&format!("pkg ; {input}")).expect("must parse marker");
    requirement.marker().clone().expect("must have a marker")
}

#[test_case("sys_platform == 'win32'", true, false; "platform")]
#[test_case("platform_system != 'Darwin' and platform_machine == 'amd64'", true, false; "machine_case_folded")]
#[test_case("python_version < '3.10'", false, true; "python_version_numeric")]
#[test_case("python_full_version >= '3.9.10'", true, true; "full_version")]
#[test_case("platform_machine in 'arm64, aarch64'", false, true; "in_set")]
#[test_case("sys_platform not in 'win32,cygwin'", false, true; "not_in_set")]
#[test_case("os.name == 'nt' or sys.platform == 'darwin'", true, true; "legacy_names")]
#[test_case("platform_release >= '22'", false, true; "release_as_version")]
#[test_case("implementation_name == 'pypy'", false, false; "implementation")]
#[test_case("'3.9' == python_version", false, true; "literal_on_left")]
#[test_case("(sys_platform == 'linux' or sys_platform == 'darwin') and python_version >= '3.8'", false, true; "grouped")]
#[test_case("extra == 'cuda'", false, false; "extra_unset")]
#[test]
fn evaluate(input: &str, on_windows: bool, on_macos: bool) {
    let tree = marker(input);
    assert_eq!(tree.evaluate(&windows()), on_windows, "{input} on windows");
    assert_eq!(tree.evaluate(&macos()), on_macos, "{input} on macos");
}

#[test]
fn extra_is_bound_per_evaluation() {
    let tree = marker("extra == 'cuda'");
    assert!(tree.evaluate(&windows().with_extra("cuda")));
    assert!(!tree.evaluate(&windows().with_extra("cpu")));
}

#[test]
fn absent_marker_always_applies() {
    assert!(evaluate_marker(None, &MarkerEnvironment::default()));
}

#[test]
fn display_parses_back() {
    let tree = marker("python_version >= '3.8' and (os_name == 'nt' or sys_platform == 'darwin')");
    let reparsed = marker(&tree.to_string());
    assert_eq!(tree, reparsed);
}
