#![allow(clippy::unwrap_used)]

use archml::ImportMap;
use archml::project::CompilationSession;
use tempfile::TempDir;

use crate::helpers::Workspace;

#[test]
fn test_mnemonic_imports() {
    let ws = Workspace::new();
    ws.write("libs/shared/types.archml", "type Money {}\n");
    ws.write(
        "main.archml",
        "from shared/types import Money\ntype Order { field total: Money }\n",
    );
    let map = ws
        .root_map()
        .with_mnemonic("shared", ws.path("libs/shared"));

    let units = ws.compile_with(&["main.archml"], &map).unwrap();

    assert!(ws.artifact("shared/types").is_file());
    assert_eq!(
        units["shared/types"].types[0].qualified_name.as_deref(),
        Some("shared/types::Money")
    );
}

#[test]
fn test_remote_imports() {
    let ws = Workspace::new();
    let checkout = TempDir::new().unwrap();
    std::fs::create_dir_all(checkout.path().join("api")).unwrap();
    std::fs::write(
        checkout.path().join("api/v1.archml"),
        "interface PaymentApi @v1 { field amount: Decimal }\n",
    )
    .unwrap();
    ws.write(
        "main.archml",
        "from @payments/api/v1 import PaymentApi\ncomponent Shop { requires PaymentApi@v1 }\n",
    );
    let map = ws.root_map().with_remote("payments", checkout.path());

    let units = ws.compile_with(&["main.archml"], &map).unwrap();

    let keys: Vec<&str> = units.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["@payments/api/v1", "main"]);
    assert!(ws.artifact("@payments/api/v1").is_file());
    assert_eq!(
        units["@payments/api/v1"].interfaces[0].qualified_name.as_deref(),
        Some("@payments/api/v1::PaymentApi")
    );
}

#[test]
fn test_nested_entry_keys() {
    let ws = Workspace::new();
    ws.write(
        "shop/orders.archml",
        "system Shop { component Cart {} component Till {} }\n",
    );

    let units = ws.compile(&["shop/orders.archml"]).unwrap();

    let shop = &units["shop/orders"].systems[0];
    assert_eq!(shop.qualified_name.as_deref(), Some("shop/orders::Shop"));
    assert_eq!(
        shop.components[1].qualified_name.as_deref(),
        Some("shop/orders::Shop::Till")
    );
    assert!(ws.artifact("shop/orders").is_file());
}

#[test]
fn test_entry_outside_every_base_uses_file_stem() {
    let ws = Workspace::new();
    ws.write("outside/standalone.archml", "component Lone {}\n");
    let map = ImportMap::new().with_root(ws.path("src"));

    let units = ws
        .compile_with(&["outside/standalone.archml"], &map)
        .unwrap();

    assert!(units.contains_key("standalone"));
    assert!(ws.artifact("standalone").is_file());
}

#[test]
fn test_session_reports_entry_keys() {
    let ws = Workspace::new();
    ws.write("types.archml", "type Money {}\n");
    ws.write("app/main.archml", "from types import Money\n");

    let mut session = CompilationSession::new(&ws.build_dir(), &ws.root_map());
    let key = session.compile_entry(&ws.path("app/main.archml")).unwrap();

    assert_eq!(key, "app/main");
    assert!(session.compiled("types").is_some());
    assert!(session.compiled("app/main").is_some());
    assert_eq!(session.into_compiled().len(), 2);
}

#[test]
fn test_dot_segments_in_entry_paths_are_normalised() {
    let ws = Workspace::new();
    ws.write("a.archml", "component A {}\n");
    ws.write("sub/a.archml", "component SubA {}\n");
    ws.write("main.archml", "from a import A\n");
    let entries = ["sub/../a.archml", "./main.archml", "sub/./a.archml"];

    for _ in 0..2 {
        let units = ws.compile(&entries).unwrap();

        let keys: Vec<&str> = units.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "main", "sub/a"]);
        assert_eq!(units["a"].components[0].name, "A");
        assert_eq!(units["sub/a"].components[0].name, "SubA");
    }
    assert!(ws.artifact("a").is_file());
    assert!(ws.artifact("sub/a").is_file());
}
