#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::model::{ArchFile, Field, PrimitiveType, TypeDef, TypeRef};
use crate::parser::parse;
use crate::project::{
    ArtifactError, artifact_path, deserialize, read_artifact, serialize, write_artifact,
};

const SOURCE: &str = r#"
from shared/types import Money

enum Status { Open Closed }

type Order {
    field id: Int
    field lines: List<Line>
    field meta: Map<String, Optional<Money>>
    field report: File { filetype = "pdf" }
}

interface OrderApi @v2 {
    field order: Order
}

system Shop {
    component Cart { requires OrderApi@v2 }
    component Orders { provides OrderApi@v2 }
    connect Cart -> Orders by OrderApi@v2 { protocol = "gRPC" async = true }
}
"#;

fn sample() -> ArchFile {
    let mut file = parse(SOURCE).unwrap_or_else(|e| panic!("parse failed: {e}"));
    file.assign_qualified_names("shop/main");
    file
}

#[test]
fn test_document_envelope() {
    let data = serialize(&ArchFile::default()).unwrap();
    assert!(data.starts_with(r#"{"v":"1","file":{"#), "got {data}");
    assert!(!data.contains('\n'));
}

#[test]
fn test_type_refs_carry_kind_tags() {
    let data = serialize(&sample()).unwrap();
    assert!(data.contains(r#"{"k":"list","element":{"k":"named","name":"Line"}}"#));
    assert!(data.contains(r#""k":"optional""#));
    assert!(data.contains(r#""k":"file""#));
    assert!(data.contains(r#"{"k":"primitive","primitive":"Int"}"#));
}

#[test]
fn test_decode_preserves_the_whole_tree() {
    let file = sample();
    let decoded = deserialize(&serialize(&file).unwrap()).unwrap();
    assert_eq!(decoded, file);
    assert_eq!(
        decoded.systems[0].components[0].qualified_name.as_deref(),
        Some("shop/main::Shop::Cart")
    );
    assert!(decoded.systems[0].connections[0].is_async);
}

#[test]
fn test_missing_collections_default_to_empty() {
    let decoded = deserialize(r#"{"v":"1","file":{}}"#).unwrap();
    assert_eq!(decoded, ArchFile::default());
}

#[test]
fn test_unsupported_version() {
    let err = deserialize(r#"{"v":"2","file":{}}"#).unwrap_err();
    match err {
        ArtifactError::UnsupportedVersion(v) => assert_eq!(v, "2"),
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn test_malformed_document() {
    assert!(matches!(deserialize("{not json"), Err(ArtifactError::Json(_))));
    assert!(matches!(
        deserialize(r#"{"file":{}}"#),
        Err(ArtifactError::Json(_))
    ));
}

#[test]
fn test_artifact_path_mirrors_key_segments() {
    let build = Path::new("/build");
    assert_eq!(artifact_path(build, "main"), PathBuf::from("/build/main.json"));
    assert_eq!(
        artifact_path(build, "@repo/lib/types"),
        PathBuf::from("/build/@repo/lib/types.json")
    );
}

#[test]
fn test_write_creates_directories_and_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let path = artifact_path(dir.path(), "shop/orders/main");

    write_artifact(&sample(), &path).unwrap();
    write_artifact(&sample(), &path).unwrap();

    assert_eq!(read_artifact(&path).unwrap(), sample());
    let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["main.json"]);
}

#[test]
fn test_read_missing_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");
    match read_artifact(&path) {
        Err(ArtifactError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_deeply_nested_type_refs_read_back() {
    let mut type_ref = TypeRef::primitive(PrimitiveType::String);
    for depth in 0..300 {
        type_ref = if depth % 2 == 0 {
            TypeRef::list(type_ref)
        } else {
            TypeRef::optional(type_ref)
        };
    }
    let file = ArchFile {
        types: vec![TypeDef {
            name: "Deep".to_string(),
            fields: vec![Field::new("x", type_ref)],
            ..TypeDef::default()
        }],
        ..ArchFile::default()
    };

    let dir = TempDir::new().unwrap();
    let path = artifact_path(dir.path(), "deep");
    write_artifact(&file, &path).unwrap();
    assert_eq!(read_artifact(&path).unwrap(), file);
}
