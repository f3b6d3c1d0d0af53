//! Tests for filesystem binding discovery

use bpdeps_bindings::{
    BindingResolver, CNB_BINDINGS, Error, FsBindingResolver, SERVICE_BINDING_ROOT,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_binding(root: &Path, name: &str, files: &[(&str, &str)]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, content) in files {
        fs::write(dir.join(file), content).unwrap();
    }
}

#[test]
fn test_resolves_bindings_under_platform_dir() {
    let platform = TempDir::new().unwrap();
    let root = platform.path().join("bindings");
    write_binding(
        &root,
        "mirror",
        &[
            ("type", "dependency-mirror\n"),
            ("provider", "acme"),
            ("default", "https://mirror.test/{originalHost}"),
        ],
    );
    write_binding(&root, "other", &[("type", "ca-certificates")]);

    temp_env::with_vars_unset([SERVICE_BINDING_ROOT, CNB_BINDINGS], || {
        let resolver = FsBindingResolver::new();
        let bindings = resolver
            .resolve("dependency-mirror", "", platform.path())
            .unwrap();

        assert_eq!(bindings.len(), 1);
        let binding = &bindings[0];
        assert_eq!(binding.name, "mirror");
        assert_eq!(binding.binding_type, "dependency-mirror");
        assert_eq!(binding.provider, "acme");
        assert_eq!(binding.entries.len(), 1);
        assert_eq!(
            binding.entries["default"].read_string("default").unwrap(),
            "https://mirror.test/{originalHost}"
        );
    });
}

#[test]
fn test_service_binding_root_takes_precedence() {
    let platform = TempDir::new().unwrap();
    let service_root = TempDir::new().unwrap();
    let legacy_root = TempDir::new().unwrap();
    write_binding(service_root.path(), "svc", &[("type", "dependency-mapping")]);
    write_binding(legacy_root.path(), "legacy", &[("type", "dependency-mapping")]);

    temp_env::with_vars(
        [
            (SERVICE_BINDING_ROOT, Some(service_root.path())),
            (CNB_BINDINGS, Some(legacy_root.path())),
        ],
        || {
            let bindings = FsBindingResolver::new()
                .resolve("dependency-mapping", "", platform.path())
                .unwrap();
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].name, "svc");
        },
    );

    temp_env::with_vars(
        [
            (SERVICE_BINDING_ROOT, None),
            (CNB_BINDINGS, Some(legacy_root.path())),
        ],
        || {
            let bindings = FsBindingResolver::new()
                .resolve("dependency-mapping", "", platform.path())
                .unwrap();
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].name, "legacy");
        },
    );
}

#[test]
fn test_legacy_layout() {
    let root = TempDir::new().unwrap();
    let binding = root.path().join("old-style");
    fs::create_dir_all(binding.join("metadata")).unwrap();
    fs::create_dir_all(binding.join("secret")).unwrap();
    fs::write(binding.join("metadata").join("kind"), "dependency-mapping").unwrap();
    fs::write(binding.join("metadata").join("provider"), "corp").unwrap();
    fs::write(binding.join("secret").join("sha256:abc"), "file:///deps/a.tgz").unwrap();

    let bindings = FsBindingResolver::with_root(root.path())
        .resolve("dependency-mapping", "corp", Path::new("/unused"))
        .unwrap();

    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].provider, "corp");
    assert!(bindings[0].entries.contains_key("sha256:abc"));
}

#[test]
fn test_hidden_files_are_not_entries() {
    let root = TempDir::new().unwrap();
    write_binding(
        root.path(),
        "b",
        &[("type", "dependency-mirror"), (".hidden", "x"), ("default", "y")],
    );

    let bindings = FsBindingResolver::with_root(root.path())
        .resolve("dependency-mirror", "", Path::new("/unused"))
        .unwrap();
    let names: Vec<_> = bindings[0].entries.keys().cloned().collect();
    assert_eq!(names, vec!["default".to_string()]);
}

#[test]
fn test_missing_type_is_an_error() {
    let root = TempDir::new().unwrap();
    write_binding(root.path(), "broken", &[("default", "https://mirror.test")]);

    let err = FsBindingResolver::with_root(root.path())
        .resolve("dependency-mirror", "", Path::new("/unused"))
        .unwrap_err();
    assert!(matches!(err, Error::MissingType { .. }));
    assert!(err.to_string().contains("missing 'type'"));
}

#[test]
fn test_missing_root_yields_no_bindings() {
    let root = TempDir::new().unwrap();
    let bindings = FsBindingResolver::with_root(root.path().join("absent"))
        .resolve("dependency-mirror", "", Path::new("/unused"))
        .unwrap();
    assert!(bindings.is_empty());
}

#[test]
fn test_bindings_sorted_by_name() {
    let root = TempDir::new().unwrap();
    for name in ["zeta", "alpha", "mid"] {
        write_binding(root.path(), name, &[("type", "dependency-mapping")]);
    }
    let bindings = FsBindingResolver::with_root(root.path())
        .resolve("dependency-mapping", "", Path::new("/unused"))
        .unwrap();
    let names: Vec<_> = bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}
