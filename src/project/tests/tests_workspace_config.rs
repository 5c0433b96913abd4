#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::fs;

use rstest::rstest;
use rustc_hash::FxHashMap;
use tempfile::TempDir;

use crate::project::{SourceImport, WorkspaceConfig, WorkspaceConfigError};

const CONFIG: &str = r#"
build-directory: out
source-imports:
  - name: shared
    local-path: libs/shared
  - name: payments
    git-repository: https://example.com/payments.git
    revision: main
"#;

fn invalid_message(yaml: &str) -> String {
    match WorkspaceConfig::from_yaml(yaml) {
        Err(WorkspaceConfigError::Invalid(message)) => message,
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_parse_config() {
    let config = WorkspaceConfig::from_yaml(CONFIG).unwrap();
    assert_eq!(config.build_directory, "out");
    assert_eq!(
        config.source_imports,
        vec![
            SourceImport::Local {
                name: "shared".to_string(),
                local_path: "libs/shared".to_string(),
            },
            SourceImport::Git {
                name: "payments".to_string(),
                git_repository: "https://example.com/payments.git".to_string(),
                revision: "main".to_string(),
            },
        ]
    );
    assert_eq!(config.source_imports[1].name(), "payments");
}

#[test]
fn test_source_imports_are_optional() {
    let config = WorkspaceConfig::from_yaml("build-directory: build").unwrap();
    assert!(config.source_imports.is_empty());
}

#[rstest]
#[case("- a\n- b", "<string>: workspace config must be a YAML mapping")]
#[case("source-imports: []", "<string>: missing required field 'build-directory'")]
#[case("build-directory: 3", "<string>: 'build-directory' must be a string")]
#[case(
    "build-directory: out\nsource-imports: shared",
    "<string>: 'source-imports' must be a list"
)]
#[case(
    "build-directory: out\nsource-imports:\n  - shared",
    "<string>: source-imports[0] must be a YAML mapping"
)]
#[case(
    "build-directory: out\nsource-imports:\n  - local-path: libs",
    "<string>: source-imports[0]: missing required field 'name'"
)]
#[case(
    "build-directory: out\nsource-imports:\n  - name: a\n    local-path: a\n  - name: b",
    "<string>: source-imports[1] 'b': must specify either 'local-path' or 'git-repository'"
)]
#[case(
    "build-directory: out\nsource-imports:\n  - name: b\n    local-path: x\n    git-repository: y",
    "<string>: source-imports[0] 'b': must specify either 'local-path' or 'git-repository', not both"
)]
#[case(
    "build-directory: out\nsource-imports:\n  - name: p\n    git-repository: y",
    "<string>: source-imports[0]: missing required field 'revision'"
)]
fn test_invalid_config(#[case] yaml: &str, #[case] expected: &str) {
    assert_eq!(invalid_message(yaml), expected);
}

#[test]
fn test_malformed_yaml() {
    assert!(matches!(
        WorkspaceConfig::from_yaml("build-directory: [out"),
        Err(WorkspaceConfigError::Yaml { .. })
    ));
}

#[test]
fn test_load_labels_errors_with_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".archml-workspace.yaml");
    fs::write(&path, "source-imports: []").unwrap();
    let err = WorkspaceConfig::load(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("{}: missing required field 'build-directory'", path.display())
    );

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        WorkspaceConfig::load(&missing),
        Err(WorkspaceConfigError::Io { .. })
    ));
}

#[test]
fn test_find_and_build_dir() {
    let dir = TempDir::new().unwrap();
    assert_eq!(WorkspaceConfig::find(dir.path()), None);
    let path = dir.path().join(".archml-workspace.yaml");
    fs::write(&path, CONFIG).unwrap();
    assert_eq!(WorkspaceConfig::find(dir.path()), Some(path.clone()));

    let config = WorkspaceConfig::load(&path).unwrap();
    assert_eq!(config.build_dir(dir.path()), dir.path().join("out"));
}

#[test]
fn test_import_map_includes_remote_mnemonics() {
    let root = TempDir::new().unwrap();
    let checkout = TempDir::new().unwrap();
    fs::write(
        checkout.path().join(".archml-workspace.yaml"),
        "build-directory: build\nsource-imports:\n  - name: api\n    local-path: src/api\n",
    )
    .unwrap();

    let mut checkouts = FxHashMap::default();
    checkouts.insert("payments".to_string(), checkout.path().to_path_buf());

    let config = WorkspaceConfig::from_yaml(CONFIG).unwrap();
    let map = config.import_map(root.path(), &checkouts).unwrap();

    assert_eq!(map.root(), Some(root.path()));
    assert_eq!(
        map.get("shared"),
        Some(root.path().join("libs/shared").as_path())
    );
    assert_eq!(map.get("@payments"), Some(checkout.path()));
    assert_eq!(
        map.get("@payments/api"),
        Some(checkout.path().join("src/api").as_path())
    );
}

#[test]
fn test_import_map_requires_every_checkout() {
    let config = WorkspaceConfig::from_yaml(CONFIG).unwrap();
    let err = config
        .import_map(std::path::Path::new("/ws"), &FxHashMap::default())
        .unwrap_err();
    assert!(matches!(err, WorkspaceConfigError::MissingCheckout(name) if name == "payments"));
}
