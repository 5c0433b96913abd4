//! # Semantic Analysis
//!
//! Structural checks over one parsed [`ArchFile`](crate::model::ArchFile):
//! duplicate names, unresolved type and interface references, connection
//! endpoints outside their scope, and imported names missing from the
//! resolved dependency.
//!
//! Unlike the parser, analysis is exhaustive: every fault in the file is
//! collected and returned together, in a stable order.
//!
//! Business rules (isolation, cycles, interface propagation) live in
//! [`validation`](crate::validation), which runs on analyzed models.

mod analyzer;
mod diagnostics;

pub use analyzer::{ResolvedImports, analyze};
pub use diagnostics::{SemanticError, codes};
