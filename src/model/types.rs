//! Type references and fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive types built into the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Int,
    Float,
    Decimal,
    Bool,
    Bytes,
    Timestamp,
    Datetime,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        Self::String,
        Self::Int,
        Self::Float,
        Self::Decimal,
        Self::Bool,
        Self::Bytes,
        Self::Timestamp,
        Self::Datetime,
    ];

    /// Look up a primitive by its source spelling (case-sensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::Bool => "Bool",
            Self::Bytes => "Bytes",
            Self::Timestamp => "Timestamp",
            Self::Datetime => "Datetime",
        }
    }
}

/// A field type reference.
///
/// `List`, `Map` and `Optional` own further references, so a reference is an
/// arbitrarily deep tree. The serialized form carries an explicit `"k"` tag
/// per variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "k", rename_all = "snake_case")]
pub enum TypeRef {
    Primitive { primitive: PrimitiveType },
    File,
    Directory,
    List { element: Box<TypeRef> },
    Map { key: Box<TypeRef>, value: Box<TypeRef> },
    Optional { inner: Box<TypeRef> },
    Named { name: String },
}

impl TypeRef {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Self::Primitive { primitive }
    }

    pub fn list(element: TypeRef) -> Self {
        Self::List {
            element: Box::new(element),
        }
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn optional(inner: TypeRef) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    /// Collect every `Named` reference reachable through container wrappers,
    /// in source order (map keys before map values).
    pub fn named_refs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_named(&mut out);
        out
    }

    fn collect_named<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named { name } => out.push(name),
            Self::List { element } => element.collect_named(out),
            Self::Map { key, value } => {
                key.collect_named(out);
                value.collect_named(out);
            }
            Self::Optional { inner } => inner.collect_named(out),
            Self::Primitive { .. } | Self::File | Self::Directory => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { primitive } => f.write_str(primitive.as_str()),
            Self::File => f.write_str("File"),
            Self::Directory => f.write_str("Directory"),
            Self::List { element } => write!(f, "List<{element}>"),
            Self::Map { key, value } => write!(f, "Map<{key}, {value}>"),
            Self::Optional { inner } => write!(f, "Optional<{inner}>"),
            Self::Named { name } => f.write_str(name),
        }
    }
}

/// A named, typed data element of a type or interface.
///
/// `schema` and `filetype` are only meaningful for `File`/`Directory` fields;
/// this is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: None,
            schema: None,
            filetype: None,
        }
    }
}
