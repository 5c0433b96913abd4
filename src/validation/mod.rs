//! # Validation
//!
//! Architectural business rules applied to a structurally valid file:
//!
//! - **Isolation** (warning): a component or system with no ports.
//! - **Connection cycles** (error): per container, never merged across scopes.
//! - **Type cycles** (error): one graph over all types and interfaces.
//! - **Interface propagation** (error): a non-leaf container's ports must be
//!   declared by at least one direct member with the exact same version.
//!
//! Validation never touches the filesystem; [`validate_all`] fans out over
//! many compiled files with rayon.

mod graph;
mod validator;

pub use graph::{Graph, detect_cycle};
pub use validator::{ValidationError, ValidationResult, ValidationWarning, codes, validate};

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::model::ArchFile;

/// Validate every compiled unit in parallel, keyed and ordered like `units`.
pub fn validate_all(units: &IndexMap<String, ArchFile>) -> IndexMap<String, ValidationResult> {
    let entries: Vec<(&String, &ArchFile)> = units.iter().collect();
    let results: Vec<ValidationResult> = entries
        .par_iter()
        .map(|(_, file)| validate(file))
        .collect();
    entries
        .into_iter()
        .zip(results)
        .map(|((key, _), result)| (key.clone(), result))
        .collect()
}
