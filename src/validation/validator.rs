//! Business-rule checks over one analyzed file.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use thiserror::Error;

use super::graph::{Graph, detect_cycle};
use crate::model::{ArchFile, Component, Connection, Field, InterfaceRef, System};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Stable codes for validation issues.
pub mod codes {
    /// A component or system declares neither requires nor provides.
    pub const ISOLATED_ENTITY: &str = "W0001";
    /// The connections of one scope form a cycle.
    pub const CONNECTION_CYCLE: &str = "E0101";
    /// Types or interfaces reference each other in a cycle.
    pub const TYPE_CYCLE: &str = "E0102";
    /// A declared port is not backed by any direct member.
    pub const UNPROPAGATED_INTERFACE: &str = "E0103";
}

/// A non-fatal finding; the model stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationWarning {
    pub code: &'static str,
    pub message: String,
}

/// A fatal finding; the model is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub warnings: Vec<ValidationWarning>,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// No warnings and no errors.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    fn warn(&mut self, code: &'static str, message: String) {
        self.warnings.push(ValidationWarning { code, message });
    }

    fn error(&mut self, code: &'static str, message: String) {
        self.errors.push(ValidationError { code, message });
    }
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Run every business check on `file`.
///
/// Checks run in a fixed order (isolation, connection cycles, type cycles,
/// interface propagation). Within a check, systems are visited before
/// top-level components and each system visits sub-systems before its
/// components. Entities are labelled by qualified name when one is set.
pub fn validate(file: &ArchFile) -> ValidationResult {
    let mut result = ValidationResult::default();

    walk(file, &mut |entity| check_isolated(entity, &mut result));
    walk(file, &mut |entity| check_connection_cycle(entity, &mut result));
    check_type_cycles(file, &mut result);
    walk(file, &mut |entity| check_propagation(entity, &mut result));

    result
}

// ============================================================================
// TRAVERSAL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Component,
    System,
}

impl EntityKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Component => "Component",
            Self::System => "System",
        }
    }

    /// How a direct member is named in propagation messages.
    fn member_noun(self) -> &'static str {
        match self {
            Self::Component => "sub-component",
            Self::System => "member",
        }
    }
}

/// A container seen through the fields every check needs.
struct Entity<'a> {
    kind: EntityKind,
    label: &'a str,
    requires: &'a [InterfaceRef],
    provides: &'a [InterfaceRef],
    connections: &'a [Connection],
    /// Direct members' `(requires, provides)`.
    members: Vec<(&'a [InterfaceRef], &'a [InterfaceRef])>,
}

impl<'a> Entity<'a> {
    fn component(comp: &'a Component) -> Self {
        Self {
            kind: EntityKind::Component,
            label: comp.label(),
            requires: &comp.requires,
            provides: &comp.provides,
            connections: &comp.connections,
            members: comp
                .components
                .iter()
                .map(|c| (c.requires.as_slice(), c.provides.as_slice()))
                .collect(),
        }
    }

    fn system(system: &'a System) -> Self {
        Self {
            kind: EntityKind::System,
            label: system.label(),
            requires: &system.requires,
            provides: &system.provides,
            connections: &system.connections,
            members: system
                .components
                .iter()
                .map(|c| (c.requires.as_slice(), c.provides.as_slice()))
                .chain(
                    system
                        .systems
                        .iter()
                        .map(|s| (s.requires.as_slice(), s.provides.as_slice())),
                )
                .collect(),
        }
    }
}

fn walk<'a>(file: &'a ArchFile, visit: &mut impl FnMut(&Entity<'a>)) {
    for system in &file.systems {
        walk_system(system, visit);
    }
    for comp in &file.components {
        walk_component(comp, visit);
    }
}

fn walk_system<'a>(system: &'a System, visit: &mut impl FnMut(&Entity<'a>)) {
    visit(&Entity::system(system));
    for sub in &system.systems {
        walk_system(sub, visit);
    }
    for comp in &system.components {
        walk_component(comp, visit);
    }
}

fn walk_component<'a>(comp: &'a Component, visit: &mut impl FnMut(&Entity<'a>)) {
    visit(&Entity::component(comp));
    for sub in &comp.components {
        walk_component(sub, visit);
    }
}

// ============================================================================
// CHECKS
// ============================================================================

fn check_isolated(entity: &Entity<'_>, result: &mut ValidationResult) {
    if entity.requires.is_empty() && entity.provides.is_empty() {
        result.warn(
            codes::ISOLATED_ENTITY,
            format!(
                "{} '{}' has no requires or provides interfaces (isolated).",
                entity.kind.as_str(),
                entity.label
            ),
        );
    }
}

/// Each container's connection list is its own graph.
fn check_connection_cycle(entity: &Entity<'_>, result: &mut ValidationResult) {
    if entity.connections.is_empty() {
        return;
    }
    let mut graph = Graph::new();
    for conn in entity.connections {
        graph
            .entry(conn.source.entity.as_str())
            .or_default()
            .push(conn.target.entity.as_str());
    }
    if let Some(cycle) = detect_cycle(&graph) {
        result.error(
            codes::CONNECTION_CYCLE,
            format!(
                "Connection cycle detected in '{}': {}.",
                entity.label,
                cycle.join(" -> ")
            ),
        );
    }
}

/// One file-wide graph over type and interface names. Edges to enums and to
/// undefined or imported names are dropped.
fn check_type_cycles(file: &ArchFile, result: &mut ValidationResult) {
    let defined: FxHashSet<&str> = file
        .types
        .iter()
        .map(|t| t.name.as_str())
        .chain(file.interfaces.iter().map(|i| i.name.as_str()))
        .collect();

    let definitions = file
        .types
        .iter()
        .map(|t| (t.name.as_str(), t.fields.as_slice()))
        .chain(
            file.interfaces
                .iter()
                .map(|i| (i.name.as_str(), i.fields.as_slice())),
        );

    let mut graph: Graph<'_> = IndexMap::new();
    for (name, fields) in definitions {
        let edges = graph.entry(name).or_default();
        edges.extend(
            field_refs(fields)
                .into_iter()
                .filter(|r| defined.contains(r)),
        );
    }

    if let Some(cycle) = detect_cycle(&graph) {
        result.error(
            codes::TYPE_CYCLE,
            format!(
                "Recursive type definition cycle detected: {}.",
                cycle.join(" -> ")
            ),
        );
    }
}

fn field_refs(fields: &[Field]) -> Vec<&str> {
    fields.iter().flat_map(|f| f.type_ref.named_refs()).collect()
}

/// Exact `(name, version)` matching against the union of the direct
/// members' same-direction ports. Leaves are exempt.
fn check_propagation(entity: &Entity<'_>, result: &mut ValidationResult) {
    if entity.members.is_empty() {
        return;
    }
    let member_requires: FxHashSet<_> = entity
        .members
        .iter()
        .flat_map(|(requires, _)| requires.iter().map(InterfaceRef::key))
        .collect();
    let member_provides: FxHashSet<_> = entity
        .members
        .iter()
        .flat_map(|(_, provides)| provides.iter().map(InterfaceRef::key))
        .collect();
    let kind = entity.kind.as_str();
    let holder = entity.kind.member_noun();

    for r in entity.provides {
        if !member_provides.contains(&r.key()) {
            result.error(
                codes::UNPROPAGATED_INTERFACE,
                format!(
                    "{kind} '{}' provides interface '{}' but no {holder} provides it.",
                    entity.label, r.name
                ),
            );
        }
    }
    for r in entity.requires {
        if !member_requires.contains(&r.key()) {
            result.error(
                codes::UNPROPAGATED_INTERFACE,
                format!(
                    "{kind} '{}' requires interface '{}' but no {holder} requires it.",
                    entity.label, r.name
                ),
            );
        }
    }
}
