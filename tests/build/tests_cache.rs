#![allow(clippy::unwrap_used)]

use std::fs;
use std::time::{Duration, SystemTime};

use crate::helpers::{HOUR, Workspace, modified, set_age, set_modified};

const TYPES: &str = "type Money { field amount: Decimal }\n";
const MAIN: &str = "from types import Money\n\ntype Order { field total: Money }\n";

/// A compiled `main -> types` workspace whose artifacts are half an hour old.
fn compiled_workspace() -> Workspace {
    let ws = Workspace::new();
    ws.write("types.archml", TYPES);
    ws.write("main.archml", MAIN);
    ws.compile(&["main.archml"]).unwrap();
    let written = SystemTime::now() - Duration::from_secs(HOUR / 2);
    set_modified(&ws.artifact("types"), written);
    set_modified(&ws.artifact("main"), written);
    ws
}

#[test]
fn test_dependencies_come_first() {
    let ws = Workspace::new();
    ws.write("types.archml", TYPES);
    ws.write("main.archml", MAIN);

    let units = ws.compile(&["main.archml"]).unwrap();
    let keys: Vec<&str> = units.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["types", "main"]);
    assert!(ws.artifact("types").is_file());
    assert!(ws.artifact("main").is_file());
}

#[test]
fn test_unchanged_sources_reuse_artifacts() {
    let ws = compiled_workspace();
    let before = (modified(&ws.artifact("types")), modified(&ws.artifact("main")));

    let units = ws.compile(&["main.archml"]).unwrap();

    assert_eq!(units.len(), 2);
    assert_eq!(
        units["main"].types[0].qualified_name.as_deref(),
        Some("main::Order")
    );
    let after = (modified(&ws.artifact("types")), modified(&ws.artifact("main")));
    assert_eq!(before, after);
}

#[test]
fn test_touched_source_rebuilds_only_itself() {
    let ws = compiled_workspace();
    let types_before = modified(&ws.artifact("types"));
    let main_before = modified(&ws.artifact("main"));
    set_age(&ws.path("main.archml"), 60);

    ws.compile(&["main.archml"]).unwrap();

    assert_eq!(modified(&ws.artifact("types")), types_before);
    assert!(modified(&ws.artifact("main")) > main_before);
}

#[test]
fn test_touched_dependency_rebuilds_dependents() {
    let ws = compiled_workspace();
    let types_before = modified(&ws.artifact("types"));
    let main_before = modified(&ws.artifact("main"));
    ws.write("types.archml", "type Money { field amount: Decimal field currency: String }\n");
    set_age(&ws.path("types.archml"), 60);

    let units = ws.compile(&["main.archml"]).unwrap();

    assert!(modified(&ws.artifact("types")) > types_before);
    assert!(modified(&ws.artifact("main")) > main_before);
    assert_eq!(units["types"].types[0].fields.len(), 2);
}

#[test]
fn test_dependency_rebuilt_in_an_earlier_session_invalidates() {
    let ws = compiled_workspace();
    let main_before = modified(&ws.artifact("main"));
    set_age(&ws.path("types.archml"), 60);

    ws.compile(&["types.archml"]).unwrap();
    assert_eq!(modified(&ws.artifact("main")), main_before);

    ws.compile(&["main.archml"]).unwrap();
    assert!(modified(&ws.artifact("main")) > main_before);
}

#[test]
fn test_unreadable_artifact_is_rebuilt() {
    let ws = compiled_workspace();
    fs::write(ws.artifact("types"), r#"{"v":"0","file":{}}"#).unwrap();

    let units = ws.compile(&["main.archml"]).unwrap();

    assert_eq!(units["types"].types[0].name, "Money");
    let data = fs::read_to_string(ws.artifact("types")).unwrap();
    assert!(data.starts_with(r#"{"v":"1""#));
}

#[test]
fn test_shared_dependency_compiled_once() {
    let ws = Workspace::new();
    ws.write("types.archml", TYPES);
    ws.write("a.archml", "from types import Money\ntype A { field m: Money }\n");
    ws.write("b.archml", "from types import Money\ntype B { field m: Money }\n");

    let units = ws.compile(&["a.archml", "b.archml", "a.archml"]).unwrap();

    let keys: Vec<&str> = units.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["types", "a", "b"]);
}

#[test]
fn test_deeply_nested_unit_is_served_from_cache() {
    let ws = Workspace::new();
    let source = format!(
        "type Deep {{ field x: {}String{} }}\n",
        "List<".repeat(200),
        ">".repeat(200)
    );
    ws.write("deep.archml", &source);
    ws.compile(&["deep.archml"]).unwrap();
    set_age(&ws.artifact("deep"), HOUR / 2);
    let before = modified(&ws.artifact("deep"));

    ws.compile(&["deep.archml"]).unwrap();

    assert_eq!(modified(&ws.artifact("deep")), before);
}
