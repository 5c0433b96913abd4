//! Foundation types for the ArchML toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`Position`] - 1-based line/column locations for tokens and errors
//! - Domain constants (file extensions, import-map keys, artifact version)
//!
//! This module has NO dependencies on other archml modules.

pub mod constants;
mod position;

pub use position::Position;
