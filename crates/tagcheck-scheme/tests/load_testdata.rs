//! Integration test: install the fixture scheme under `testdata/scheme`.
//!
//! The fixture mirrors a slice of the OpenShift origin API: shared upstream
//! metadata types plus the build and image groups, each with an internal
//! and a `v1` representation.

use std::path::PathBuf;

use tagcheck_core::{GroupVersion, TypeName};
use tagcheck_scheme::DescriptorLoader;

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn tn(qualified: &str) -> TypeName {
    qualified.parse().unwrap()
}

#[test]
fn test_fixture_scheme_installs_and_verifies() {
    let loader = DescriptorLoader::new().unwrap();
    let scheme = loader.load(&[repo_root().join("testdata/scheme")]).unwrap();
    scheme.verify().unwrap();

    assert_eq!(
        scheme.prioritized_versions_all_groups(),
        vec![
            GroupVersion::new("build.openshift.io", "v1"),
            GroupVersion::new("image.openshift.io", "v1"),
        ]
    );
    assert_eq!(
        scheme.internal_versions_all_groups(),
        vec![
            GroupVersion::internal("build.openshift.io"),
            GroupVersion::internal("image.openshift.io"),
        ]
    );

    let kinds: Vec<&str> = scheme
        .known_kinds(&GroupVersion::internal("build.openshift.io"))
        .into_iter()
        .map(|(kind, _)| kind)
        .collect();
    assert_eq!(kinds, vec!["Build", "BuildList"]);

    let docker = scheme
        .lookup(&tn("github.com/openshift/origin/pkg/image/apis/image.DockerConfig"))
        .unwrap();
    assert!(docker.is_struct());
    assert_eq!(docker.fields()[0].tag.get("json"), "Hostname,omitempty");

    let phase = scheme
        .lookup(&tn("github.com/openshift/origin/pkg/build/apis/build.BuildPhase"))
        .unwrap();
    assert!(!phase.is_struct());
}

#[test]
fn test_fixture_scheme_with_violations_overlay() {
    let loader = DescriptorLoader::new().unwrap();
    let root = repo_root();
    let scheme = loader
        .load(&[root.join("testdata/scheme"), root.join("testdata/violations")])
        .unwrap();
    scheme.verify().unwrap();
    assert_eq!(scheme.groups().len(), 3);
    assert_eq!(
        scheme.prioritized_versions_for_group("route.openshift.io"),
        vec![GroupVersion::new("route.openshift.io", "v1")]
    );
}

#[test]
fn test_overlay_alone_has_dangling_references() {
    let loader = DescriptorLoader::new().unwrap();
    let scheme = loader.load(&[repo_root().join("testdata/violations")]).unwrap();
    let err = scheme.verify().unwrap_err();
    assert!(err.to_string().contains("k8s.io/apimachinery/pkg/apis/meta/v1.ObjectMeta"));
}
