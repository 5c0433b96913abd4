#![allow(clippy::unwrap_used)]

use archml::compile_files;
use archml::project::{WorkspaceConfig, artifact_path};
use rustc_hash::FxHashMap;

use crate::helpers::Workspace;

#[test]
fn test_compile_with_workspace_config() {
    let ws = Workspace::new();
    ws.write(
        ".archml-workspace.yaml",
        "build-directory: out\n\
         source-imports:\n  - name: shared\n    local-path: libs/shared\n",
    );
    ws.write("libs/shared/types.archml", "type Money {}\n");
    let entry = ws.write(
        "app/main.archml",
        "from shared/types import Money\ntype Order { field total: Money }\n",
    );

    let config = WorkspaceConfig::load(&WorkspaceConfig::find(ws.root()).unwrap()).unwrap();
    let map = config.import_map(ws.root(), &FxHashMap::default()).unwrap();
    let build_dir = config.build_dir(ws.root());

    let units = compile_files(&[entry], &build_dir, &map).unwrap();

    let keys: Vec<&str> = units.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["shared/types", "app/main"]);
    assert!(artifact_path(&build_dir, "shared/types").is_file());
    assert!(artifact_path(&build_dir, "app/main").is_file());
}
