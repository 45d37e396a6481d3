//! Tests for requirement list normalization.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use pyreq::{MarkerEnvironment, Normalizer, normalize};

fn linux() -> MarkerEnvironment {
    MarkerEnvironment::builder()
        .python_version("3.10")
        .python_full_version("3.10.12")
        .sys_platform("linux")
        .os_name("posix")
        .platform_machine("x86_64")
        .platform_system("Linux")
        .build()
}

#[test]
fn mixed_requirement_file() {
    let lines = [
        "torch==2.3.0",
        "diffusers[torch]==0.10.2",
        "NUMPY",
        "-e .",
        "--index-url https://pypi.python.org/simple",
        "git+https://github.com/WASasquatch/img2texture.git",
        "protobuf<5,>=4.25.3",
    ];
    let expected = [
        "torch==2.3.0",
        "diffusers==0.10.2",
        "numpy",
        "img2texture",
        "protobuf<5",
        "protobuf>=4.25.3",
    ];

    let normalized = normalize(lines, &linux());
    assert_eq!(
        normalized.iter().map(String::as_str).collect::<BTreeSet<_>>(),
        expected.into_iter().collect::<BTreeSet<_>>(),
    );
    assert_eq!(normalized, expected, "first-seen order is kept");
}

#[test]
fn requirements_file_text() {
    let file = "\
# Core
torch>=2.0  # CUDA build installed separately
--extra-index-url https://download.pytorch.org/whl/cu118
-r requirements-optional.txt

Pillow>=9.5.0
opencv-python-headless
pywin32>=306; sys_platform == 'win32'
triton; sys_platform == 'linux' and platform_machine == 'x86_64'
-e git+https://github.com/facebookresearch/segment-anything.git#egg=segment_anything
https://github.com/Gourieff/Assets/raw/main/Insightface/insightface-0.7.3-cp310-cp310-linux_x86_64.whl
scikit-image>=0.20.0-beta
";

    assert_eq!(
        normalize(file.lines(), &linux()),
        vec![
            "torch>=2.0",
            "pillow>=9.5.0",
            "opencv-python-headless",
            "triton",
            "segment_anything",
            "insightface==0.7.3",
        ]
    );
}

#[test]
fn pip_compile_output() {
    let file = "\
numpy==1.26.4 \\
    --hash=sha256:af36f9b3c1d1 \\
    --hash=sha256:b831295e5472
-e git+https://github.com/user/repo.git#egg=pkg[extra]
";

    let once = normalize(file.lines(), &linux());
    assert_eq!(once, vec!["numpy==1.26.4", "pkg"]);
    assert_eq!(normalize(&once, &linux()), once);
}

#[test]
fn unknown_marker_variable_drops_line() {
    assert!(normalize(["cupy; gpu_vendor == 'nvidia'"], &linux()).is_empty());
}

fn line() -> impl Strategy<Value = String> {
    let fixed = prop::sample::select(vec![
        "torch==2.3.0",
        "Torch",
        "diffusers[torch]==0.10.2",
        "protobuf<5,>=4.25.3",
        "pkg (>=1.0, <2.0)",
        "sam2",
        "SAM-2",
        "-e .",
        "--find-links https://example.com/wheels",
        "git+https://github.com/user/Repo.git@v1.0",
        "-e git+https://github.com/user/repo.git#egg=pkg[extra]",
        "git+https://host/user/my%20repo.git",
        "numpy==1.26.4 --hash=sha256:af36f9b3c1d1",
        "pywin32; sys_platform == 'win32'",
        "https://example.com/foo-1.2.3-py3-none-any.whl",
        "pkg>=1.0-beta",
        "# comment",
    ]);
    let versioned = (
        "[a-z]{1,6}",
        prop::sample::select(vec!["==", ">=", "<", "~=", "!="]),
        "[0-9]{1,2}(\\.[0-9]{1,2}){0,2}",
    )
        .prop_map(|(name, op, version)| format!("{name}{op}{version}"));

    prop_oneof![
        fixed.prop_map(String::from),
        "[a-zA-Z][a-zA-Z0-9_.-]{0,8}",
        versioned,
    ]
}

proptest! {
    #[test]
    fn normalize_is_idempotent(lines in prop::collection::vec(line(), 0..12)) {
        let normalizer = Normalizer::builder().environment(linux()).build();
        let once = normalizer.normalize(&lines);
        let twice = normalizer.normalize(&once);
        prop_assert_eq!(once, twice);
    }
}
