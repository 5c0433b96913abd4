#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::fs;

use archml::CompilerError;
use archml::semantic::codes;

use crate::helpers::Workspace;

#[test]
fn test_deleted_dependency_is_reported() {
    let ws = Workspace::new();
    ws.write("types.archml", "type Money {}\n");
    ws.write("main.archml", "from types import Money\n");
    ws.compile(&["main.archml"]).unwrap();
    fs::remove_file(ws.path("types.archml")).unwrap();

    match ws.compile(&["main.archml"]).unwrap_err() {
        CompilerError::DependencyNotFound {
            file,
            import,
            expected,
        } => {
            assert_eq!(file, ws.path("main.archml"));
            assert_eq!(import, "types");
            assert_eq!(expected, ws.path("types.archml"));
        }
        other => panic!("expected DependencyNotFound, got {other:?}"),
    }
}

#[test]
fn test_circular_import_names_the_cycle() {
    let ws = Workspace::new();
    ws.write("a.archml", "from b import B\ncomponent A {}\n");
    ws.write("b.archml", "from c import C\ncomponent B {}\n");
    ws.write("c.archml", "from a import A\ncomponent C {}\n");

    let err = ws.compile(&["a.archml"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Circular dependency detected: a -> b -> c -> a"
    );
    assert_eq!(err.file(), ws.path("a.archml"));
    assert!(!ws.artifact("a").exists());
}

#[test]
fn test_self_import_is_a_cycle() {
    let ws = Workspace::new();
    ws.write("a.archml", "from a import A\ncomponent A {}\n");
    match ws.compile(&["a.archml"]).unwrap_err() {
        CompilerError::CircularDependency { cycle, .. } => assert_eq!(cycle, vec!["a", "a"]),
        other => panic!("expected CircularDependency, got {other:?}"),
    }
}

#[test]
fn test_semantic_errors_fail_the_unit() {
    let ws = Workspace::new();
    ws.write("types.archml", "type Money {}\n");
    ws.write(
        "main.archml",
        "from types import Money, Currency\ntype Order { field total: Money }\n",
    );

    match ws.compile(&["main.archml"]).unwrap_err() {
        CompilerError::Semantic { file, errors } => {
            assert_eq!(file, ws.path("main.archml"));
            let found: Vec<&str> = errors.iter().map(|e| e.code).collect();
            assert_eq!(found, vec![codes::UNDEFINED_IMPORT]);
            assert_eq!(errors[0].message, "'Currency' is not defined in 'types'");
        }
        other => panic!("expected Semantic, got {other:?}"),
    }
    assert!(ws.artifact("types").is_file());
    assert!(!ws.artifact("main").exists());
}

#[test]
fn test_semantic_error_display_lists_every_message() {
    let ws = Workspace::new();
    ws.write("main.archml", "type A {}\ntype A {}\ntype B { field x: Nope }\n");

    let err = ws.compile(&["main.archml"]).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("\n  - Duplicate type name 'A'"), "{text}");
    assert!(text.contains("\n  - Undefined type 'Nope' in field 'x' of type 'B'"), "{text}");
}

#[test]
fn test_syntax_error_in_dependency() {
    let ws = Workspace::new();
    ws.write("types.archml", "type Money {\n");
    ws.write("main.archml", "from types import Money\n");

    match ws.compile(&["main.archml"]).unwrap_err() {
        CompilerError::Syntax { file, source } => {
            assert_eq!(file, ws.path("types.archml"));
            assert_eq!(source.position().line, 2);
        }
        other => panic!("expected Syntax, got {other:?}"),
    }
}

#[test]
fn test_missing_entry_file() {
    let ws = Workspace::new();
    assert!(matches!(
        ws.compile(&["missing.archml"]),
        Err(CompilerError::Io { .. })
    ));
}

#[test]
fn test_unknown_remote_repository() {
    let ws = Workspace::new();
    ws.write("main.archml", "from @billing/api import Invoice\n");

    match ws.compile(&["main.archml"]).unwrap_err() {
        CompilerError::RemoteImportUnresolvable { import, repo, .. } => {
            assert_eq!(import, "@billing/api");
            assert_eq!(repo, "billing");
        }
        other => panic!("expected RemoteImportUnresolvable, got {other:?}"),
    }
}
