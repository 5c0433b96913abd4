//! Architectural entities: definitions, containers and connections.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::Field;
use crate::base::constants::QUALIFIED_SEPARATOR;

/// A reference to an interface, optionally pinned to a version.
///
/// `version: None` is an unversioned reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl InterfaceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// The exact `(name, version)` matching key.
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.name, self.version.as_deref())
    }
}

impl fmt::Display for InterfaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    /// Values in declaration order.
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

/// A named, optionally versioned contract of typed fields.
///
/// `(name, version)` identifies the definition: `Foo` and `Foo@v2` coexist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

impl InterfaceDef {
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.name, self.version.as_deref())
    }
}

/// One end of a connection, resolved within the enclosing container's scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEndpoint {
    pub entity: String,
}

/// A directed data-flow edge between two members of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub source: ConnectionEndpoint,
    pub target: ConnectionEndpoint,
    pub interface: InterfaceRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Connection {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        interface: InterfaceRef,
    ) -> Self {
        Self {
            source: ConnectionEndpoint {
                entity: source.into(),
            },
            target: ConnectionEndpoint {
                entity: target.into(),
            },
            interface,
            protocol: None,
            is_async: false,
            description: None,
        }
    }
}

/// A module with interface ports and optional nested sub-components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires: Vec<InterfaceRef>,
    #[serde(default)]
    pub provides: Vec<InterfaceRef>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

impl Component {
    /// A name-only component, as produced by `use component Name`.
    pub fn stub(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Qualified name when assigned, bare name otherwise.
    pub fn label(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }

    fn qualify(&mut self, prefix: &str) {
        let qualified = join_qualified(prefix, &self.name);
        for sub in &mut self.components {
            sub.qualify(&qualified);
        }
        self.qualified_name = Some(qualified);
    }
}

/// A group of components and sub-systems working toward a shared goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires: Vec<InterfaceRef>,
    #[serde(default)]
    pub provides: Vec<InterfaceRef>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub systems: Vec<System>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
}

impl System {
    /// A name-only system, as produced by `use system Name`.
    pub fn stub(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn label(&self) -> &str {
        self.qualified_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the system has any direct member (component or sub-system).
    pub fn has_members(&self) -> bool {
        !self.components.is_empty() || !self.systems.is_empty()
    }

    fn qualify(&mut self, prefix: &str) {
        let qualified = join_qualified(prefix, &self.name);
        for comp in &mut self.components {
            comp.qualify(&qualified);
        }
        for sub in &mut self.systems {
            sub.qualify(&qualified);
        }
        self.qualified_name = Some(qualified);
    }
}

/// `from <source_path> import <entities>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    /// Unresolved logical path, e.g. `shared/types` or `@repo/lib/types`.
    pub source_path: String,
    #[serde(default)]
    pub entities: Vec<String>,
}

/// The compilation unit: everything declared in one `.archml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchFile {
    #[serde(default)]
    pub imports: Vec<ImportDeclaration>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDef>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub systems: Vec<System>,
}

impl ArchFile {
    /// Whether `name` is defined at the top level as any kind of entity.
    pub fn defines(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e.name == name)
            || self.types.iter().any(|t| t.name == name)
            || self.interfaces.iter().any(|i| i.name == name)
            || self.components.iter().any(|c| c.name == name)
            || self.systems.iter().any(|s| s.name == name)
    }

    /// All top-level entity names, in declaration order per kind.
    pub fn top_level_names(&self) -> impl Iterator<Item = &str> {
        self.enums
            .iter()
            .map(|e| e.name.as_str())
            .chain(self.types.iter().map(|t| t.name.as_str()))
            .chain(self.interfaces.iter().map(|i| i.name.as_str()))
            .chain(self.components.iter().map(|c| c.name.as_str()))
            .chain(self.systems.iter().map(|s| s.name.as_str()))
    }

    /// Stamp `<prefix>::<Name>` qualified names onto every entity, recursing
    /// into nested containers.
    pub fn assign_qualified_names(&mut self, prefix: &str) {
        for e in &mut self.enums {
            e.qualified_name = Some(join_qualified(prefix, &e.name));
        }
        for t in &mut self.types {
            t.qualified_name = Some(join_qualified(prefix, &t.name));
        }
        for i in &mut self.interfaces {
            i.qualified_name = Some(join_qualified(prefix, &i.name));
        }
        for c in &mut self.components {
            c.qualify(prefix);
        }
        for s in &mut self.systems {
            s.qualify(prefix);
        }
    }
}

fn join_qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}{QUALIFIED_SEPARATOR}{name}")
    }
}
