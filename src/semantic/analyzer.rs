//! The semantic analyzer
//!
//! Walks one file top-down. Names visible in the file are computed once
//! into a [`FileScope`]; every check reads from it and appends to a shared
//! error list, so the output order follows the checks and then source order.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::diagnostics::{DuplicateTracker, SemanticError, codes, duplicates};
use crate::model::{ArchFile, Component, Connection, Field, InterfaceRef, System};

/// Already-compiled dependencies, keyed by the import `source_path` as written.
pub type ResolvedImports<'a> = FxHashMap<String, &'a ArchFile>;

/// Run every structural check on `file`.
///
/// Imported names are trusted placeholders. When `resolved` is `Some`, each
/// import is additionally checked against the compiled dependency stored
/// under its `source_path`; a path missing from the map is reported.
pub fn analyze(file: &ArchFile, resolved: Option<&ResolvedImports<'_>>) -> Vec<SemanticError> {
    let scope = FileScope::new(file);
    let mut analyzer = Analyzer {
        scope: &scope,
        errors: Vec::new(),
    };

    analyzer.check_top_level_duplicates(file);
    for e in &file.enums {
        for value in duplicates(e.values.iter()) {
            analyzer.push(
                codes::DUPLICATE_ENUM_VALUE,
                format!("Duplicate value '{value}' in enum '{}'", e.name),
            );
        }
    }
    for t in &file.types {
        analyzer.check_fields(&format!("type '{}'", t.name), &t.fields);
    }
    for i in &file.interfaces {
        analyzer.check_fields(&format!("interface '{}'", i.name), &i.fields);
    }
    for comp in &file.components {
        analyzer.check_component(comp);
    }
    for system in &file.systems {
        analyzer.check_system(system);
    }
    if let Some(resolved) = resolved {
        analyzer.check_import_resolutions(file, resolved);
    }

    trace!(
        imports = file.imports.len(),
        errors = analyzer.errors.len(),
        "semantic analysis finished"
    );
    analyzer.errors
}

/// Names visible anywhere in one file.
struct FileScope<'f> {
    /// Enums, types and interfaces, plus imports: valid `Named` targets.
    type_names: FxHashSet<&'f str>,
    /// Local interface names plus imports: valid interface reference targets.
    interface_names: FxHashSet<&'f str>,
    /// Exact `(name, version)` keys of local interface definitions.
    interface_keys: FxHashSet<(&'f str, Option<&'f str>)>,
    imported: FxHashSet<&'f str>,
    /// Top-level components and systems; reachable from any system's connections.
    file_entities: FxHashSet<&'f str>,
}

impl<'f> FileScope<'f> {
    fn new(file: &'f ArchFile) -> Self {
        let imported: FxHashSet<&str> = file
            .imports
            .iter()
            .flat_map(|imp| imp.entities.iter().map(String::as_str))
            .collect();

        let mut interface_names: FxHashSet<&str> =
            file.interfaces.iter().map(|i| i.name.as_str()).collect();
        interface_names.extend(imported.iter().copied());

        let mut type_names: FxHashSet<&str> = file
            .enums
            .iter()
            .map(|e| e.name.as_str())
            .chain(file.types.iter().map(|t| t.name.as_str()))
            .collect();
        type_names.extend(interface_names.iter().copied());

        Self {
            type_names,
            interface_names,
            interface_keys: file.interfaces.iter().map(|i| i.key()).collect(),
            imported,
            file_entities: file
                .components
                .iter()
                .map(|c| c.name.as_str())
                .chain(file.systems.iter().map(|s| s.name.as_str()))
                .collect(),
        }
    }
}

struct Analyzer<'s, 'f> {
    scope: &'s FileScope<'f>,
    errors: Vec<SemanticError>,
}

impl Analyzer<'_, '_> {
    fn push(&mut self, code: &'static str, message: String) {
        self.errors.push(SemanticError::new(code, message));
    }

    // ========================================================================
    // File level
    // ========================================================================

    fn check_top_level_duplicates(&mut self, file: &ArchFile) {
        for name in duplicates(file.enums.iter().map(|e| &e.name)) {
            self.push(
                codes::DUPLICATE_DEFINITION,
                format!("Duplicate enum name '{name}'"),
            );
        }
        for name in duplicates(file.types.iter().map(|t| &t.name)) {
            self.push(
                codes::DUPLICATE_DEFINITION,
                format!("Duplicate type name '{name}'"),
            );
        }

        let mut seen_interfaces = DuplicateTracker::new();
        for iface in &file.interfaces {
            if seen_interfaces.observe(iface.key()) {
                let shown = InterfaceRef {
                    name: iface.name.clone(),
                    version: iface.version.clone(),
                };
                self.push(
                    codes::DUPLICATE_DEFINITION,
                    format!("Duplicate interface definition '{shown}'"),
                );
            }
        }

        for name in duplicates(file.components.iter().map(|c| &c.name)) {
            self.push(
                codes::DUPLICATE_DEFINITION,
                format!("Duplicate component name '{name}'"),
            );
        }
        for name in duplicates(file.systems.iter().map(|s| &s.name)) {
            self.push(
                codes::DUPLICATE_DEFINITION,
                format!("Duplicate system name '{name}'"),
            );
        }

        let enum_names: FxHashSet<&str> = file.enums.iter().map(|e| e.name.as_str()).collect();
        let mut both: Vec<&str> = file
            .types
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| enum_names.contains(name))
            .collect();
        both.sort_unstable();
        both.dedup();
        for name in both {
            self.push(
                codes::ENUM_TYPE_COLLISION,
                format!("Name '{name}' is defined as both an enum and a type"),
            );
        }
    }

    /// Duplicate field names, then unresolved named references.
    fn check_fields(&mut self, ctx: &str, fields: &[Field]) {
        for name in duplicates(fields.iter().map(|f| &f.name)) {
            self.push(
                codes::DUPLICATE_FIELD,
                format!("Duplicate field name '{name}' in {ctx}"),
            );
        }
        for field in fields {
            for name in field.type_ref.named_refs() {
                if !self.scope.type_names.contains(name) {
                    self.push(
                        codes::UNDEFINED_TYPE,
                        format!(
                            "Undefined type '{name}' in field '{}' of {ctx}",
                            field.name
                        ),
                    );
                }
            }
        }
    }

    fn check_import_resolutions(&mut self, file: &ArchFile, resolved: &ResolvedImports<'_>) {
        for imp in &file.imports {
            let Some(dependency) = resolved.get(&imp.source_path) else {
                self.push(
                    codes::UNRESOLVED_IMPORT,
                    format!("Import source '{}' could not be resolved", imp.source_path),
                );
                continue;
            };
            for entity in &imp.entities {
                if !dependency.defines(entity) {
                    self.push(
                        codes::UNDEFINED_IMPORT,
                        format!("'{entity}' is not defined in '{}'", imp.source_path),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Containers
    // ========================================================================

    fn check_component(&mut self, comp: &Component) {
        let ctx = format!("component '{}'", comp.name);

        for name in duplicates(comp.components.iter().map(|c| &c.name)) {
            self.push(
                codes::DUPLICATE_MEMBER,
                format!("Duplicate sub-component name '{name}' in {ctx}"),
            );
        }
        self.check_ports(&ctx, &comp.requires, &comp.provides);

        let members: FxHashSet<&str> = comp.components.iter().map(|c| c.name.as_str()).collect();
        for conn in &comp.connections {
            self.check_connection(&ctx, conn, |name| members.contains(name));
        }

        for sub in &comp.components {
            self.check_component(sub);
        }
    }

    fn check_system(&mut self, system: &System) {
        let ctx = format!("system '{}'", system.name);

        for name in duplicates(system.components.iter().map(|c| &c.name)) {
            self.push(
                codes::DUPLICATE_MEMBER,
                format!("Duplicate component name '{name}' in {ctx}"),
            );
        }
        for name in duplicates(system.systems.iter().map(|s| &s.name)) {
            self.push(
                codes::DUPLICATE_MEMBER,
                format!("Duplicate sub-system name '{name}' in {ctx}"),
            );
        }

        let component_names: FxHashSet<&str> =
            system.components.iter().map(|c| c.name.as_str()).collect();
        let system_names: FxHashSet<&str> =
            system.systems.iter().map(|s| s.name.as_str()).collect();
        let mut both: Vec<&str> = component_names
            .intersection(&system_names)
            .copied()
            .collect();
        both.sort_unstable();
        for name in both {
            self.push(
                codes::MEMBER_KIND_COLLISION,
                format!("{ctx}: name '{name}' is used for both a component and a sub-system"),
            );
        }

        self.check_ports(&ctx, &system.requires, &system.provides);

        let scope = self.scope;
        for conn in &system.connections {
            self.check_connection(&ctx, conn, |name| {
                component_names.contains(name)
                    || system_names.contains(name)
                    || scope.file_entities.contains(name)
                    || scope.imported.contains(name)
            });
        }

        for comp in &system.components {
            self.check_component(comp);
        }
        for sub in &system.systems {
            self.check_system(sub);
        }
    }

    // ========================================================================
    // References
    // ========================================================================

    fn check_ports(&mut self, ctx: &str, requires: &[InterfaceRef], provides: &[InterfaceRef]) {
        for r in requires {
            self.check_interface_ref(ctx, r, "requires");
        }
        for r in provides {
            self.check_interface_ref(ctx, r, "provides");
        }
    }

    fn check_connection(
        &mut self,
        ctx: &str,
        conn: &Connection,
        in_scope: impl Fn(&str) -> bool,
    ) {
        let source = &conn.source.entity;
        let target = &conn.target.entity;
        if !in_scope(source) {
            self.push(
                codes::UNKNOWN_ENDPOINT,
                format!("{ctx}: connection source '{source}' is not a known member entity"),
            );
        }
        if !in_scope(target) {
            self.push(
                codes::UNKNOWN_ENDPOINT,
                format!("{ctx}: connection target '{target}' is not a known member entity"),
            );
        }
        self.check_interface_ref(ctx, &conn.interface, "connect ... by");
    }

    /// Imported names skip the version check: the imported definition is trusted.
    fn check_interface_ref(&mut self, ctx: &str, r: &InterfaceRef, keyword: &str) {
        if !self.scope.interface_names.contains(r.name.as_str()) {
            self.push(
                codes::UNKNOWN_INTERFACE,
                format!(
                    "{ctx}: '{keyword} {r}' refers to unknown interface '{}'",
                    r.name
                ),
            );
            return;
        }

        let Some(version) = r.version.as_deref() else {
            return;
        };
        if self.scope.imported.contains(r.name.as_str()) {
            return;
        }
        if !self.scope.interface_keys.contains(&r.key()) {
            self.push(
                codes::UNKNOWN_INTERFACE_VERSION,
                format!(
                    "{ctx}: '{keyword} {r}': no version '{version}' of interface '{}' is defined",
                    r.name
                ),
            );
        }
    }
}
