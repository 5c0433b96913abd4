//! Semantic model of a compiled `.archml` file.
//!
//! The parser builds an [`ArchFile`] tree; the analyzer and validator read
//! it; the build orchestrator stamps qualified names onto it and persists it
//! as an artifact. Containers own their children exclusively, so the tree
//! has no back-references and is always traversed top-down.

mod entities;
mod types;

pub use entities::{
    ArchFile, Component, Connection, ConnectionEndpoint, EnumDef, ImportDeclaration,
    InterfaceDef, InterfaceRef, System, TypeDef,
};
pub use types::{Field, PrimitiveType, TypeRef};
