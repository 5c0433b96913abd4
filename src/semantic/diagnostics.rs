//! Semantic errors, their codes, and the report-once duplicate tracker.

use std::hash::Hash;

use rustc_hash::FxHashSet;
use thiserror::Error;

// ============================================================================
// ERROR TYPE
// ============================================================================

/// A structural fault found by [`analyze`](super::analyze).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SemanticError {
    /// Stable diagnostic code (see [`codes`]).
    pub code: &'static str,
    pub message: String,
}

impl SemanticError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable codes for semantic errors.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Semantic analysis errors
/// - **E0100-E0199**: Validation errors (see [`crate::validation`])
/// - **W0001-W0099**: Validation warnings
pub mod codes {
    /// Two top-level definitions of the same kind share a name.
    pub const DUPLICATE_DEFINITION: &str = "E0001";
    /// A name is used for both an enum and a type.
    pub const ENUM_TYPE_COLLISION: &str = "E0002";
    /// An enum lists the same value twice.
    pub const DUPLICATE_ENUM_VALUE: &str = "E0003";
    /// A type or interface declares the same field twice.
    pub const DUPLICATE_FIELD: &str = "E0004";
    /// A named type reference resolves to nothing.
    pub const UNDEFINED_TYPE: &str = "E0005";
    /// An interface reference resolves to nothing.
    pub const UNKNOWN_INTERFACE: &str = "E0006";
    /// A versioned reference names a version that is not defined.
    pub const UNKNOWN_INTERFACE_VERSION: &str = "E0007";
    /// A connection endpoint is not visible from its container.
    pub const UNKNOWN_ENDPOINT: &str = "E0008";
    /// Two members of one container share a name.
    pub const DUPLICATE_MEMBER: &str = "E0009";
    /// A component and a sub-system of one system share a name.
    pub const MEMBER_KIND_COLLISION: &str = "E0010";
    /// An import source path has no compiled counterpart.
    pub const UNRESOLVED_IMPORT: &str = "E0011";
    /// An imported name is not defined by its source file.
    pub const UNDEFINED_IMPORT: &str = "E0012";
}

// ============================================================================
// DUPLICATE TRACKER
// ============================================================================

/// Reports each duplicated key exactly once, however often it recurs.
///
/// `seen` holds every key observed; `reported` holds those already flagged.
#[derive(Debug)]
pub(crate) struct DuplicateTracker<K> {
    seen: FxHashSet<K>,
    reported: FxHashSet<K>,
}

impl<K: Eq + Hash + Clone> DuplicateTracker<K> {
    pub(crate) fn new() -> Self {
        Self {
            seen: FxHashSet::default(),
            reported: FxHashSet::default(),
        }
    }

    /// Record `key`; returns `true` the first time it turns out to be a duplicate.
    pub(crate) fn observe(&mut self, key: K) -> bool {
        if self.seen.contains(&key) {
            self.reported.insert(key)
        } else {
            self.seen.insert(key);
            false
        }
    }
}

/// The first-duplicate keys of `keys`, in encounter order.
pub(crate) fn duplicates<K, I>(keys: I) -> Vec<K>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut tracker = DuplicateTracker::new();
    keys.into_iter()
        .filter(|key| tracker.observe(key.clone()))
        .collect()
}
