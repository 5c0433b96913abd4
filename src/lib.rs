//! # archml
//!
//! Compiler for the ArchML architecture-description language: lexing,
//! parsing, semantic analysis, architectural validation and incremental,
//! import-aware builds.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → Import maps, artifacts, incremental build, workspace config
//!   ↓
//! validation  → Isolation, cycles, interface propagation
//!   ↓
//! semantic    → Name resolution and duplicate checks, E-coded diagnostics
//!   ↓
//! parser      → Hand-written lexer, recursive-descent parser
//!   ↓
//! model       → ArchFile entity tree (serde)
//!   ↓
//! base        → Position, domain constants
//! ```

// ============================================================================
// MODULES (dependency order: base → model → parser → semantic → validation → project)
// ============================================================================

/// Foundation types: Position, constants
pub mod base;

/// Semantic model: entities, type references
pub mod model;

/// Parser: lexer, recursive-descent parser, syntax errors
pub mod parser;

/// Semantic analysis of a single file against its resolved imports
pub mod semantic;

/// Architectural validation rules
pub mod validation;

/// Build orchestration: import resolution, artifacts, incremental compile
pub mod project;

// Re-export commonly needed items
pub use base::Position;
pub use model::ArchFile;
pub use parser::{SyntaxError, parse};
pub use project::{CompilerError, ImportMap, compile_files};
pub use semantic::{SemanticError, analyze};
pub use validation::{ValidationResult, validate, validate_all};
