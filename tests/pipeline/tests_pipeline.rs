#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use archml::validation::codes;
use archml::{analyze, parse, validate, validate_all};

use crate::helpers::Workspace;

#[test]
fn test_compile_then_validate_every_unit() {
    let ws = Workspace::new();
    ws.write(
        "types.archml",
        "type Money { field amount: Decimal }\n\
         interface OrderApi @v1 { field total: Money }\n",
    );
    ws.write(
        "main.archml",
        "from types import OrderApi\n\
         system Shop {\n\
             provides OrderApi@v1\n\
             component Cart { requires OrderApi@v1 }\n\
             component Orders { provides OrderApi@v1 }\n\
             connect Cart -> Orders by OrderApi@v1 { protocol = \"HTTP\" }\n\
         }\n\
         component Audit {}\n",
    );

    let units = ws.compile(&["main.archml"]).unwrap();
    let results = validate_all(&units);

    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["types", "main"]);
    assert!(results["types"].is_clean());

    let main = &results["main"];
    assert!(!main.has_errors());
    let warnings: Vec<&str> = main.warnings.iter().map(|w| w.message.as_str()).collect();
    assert_eq!(
        warnings,
        vec!["Component 'main::Audit' has no requires or provides interfaces (isolated)."]
    );
}

#[test]
fn test_single_file_pipeline_reports_cycles() {
    let file = parse(
        "interface Ping { field seq: Int }\n\
         type A { field b: B }\n\
         type B { field a: Optional<A> }\n\
         system Loop {\n\
             component X { requires Ping provides Ping }\n\
             component Y { requires Ping provides Ping }\n\
             connect X -> Y by Ping\n\
             connect Y -> X by Ping\n\
         }\n",
    )
    .unwrap_or_else(|e| panic!("parse failed: {e}"));
    assert!(analyze(&file, None).is_empty());

    let result = validate(&file);
    let errors: Vec<(&str, &str)> = result
        .errors
        .iter()
        .map(|e| (e.code, e.message.as_str()))
        .collect();
    assert_eq!(
        errors,
        vec![
            (
                codes::CONNECTION_CYCLE,
                "Connection cycle detected in 'Loop': X -> Y -> X."
            ),
            (
                codes::TYPE_CYCLE,
                "Recursive type definition cycle detected: A -> B -> A."
            ),
        ]
    );
    assert_eq!(result.warnings.len(), 1);
}
