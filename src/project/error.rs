//! Error types for the build orchestrator.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::SyntaxError;
use crate::semantic::SemanticError;

/// Errors that can occur while reading or writing compiled artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error while reading, writing or renaming an artifact.
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed JSON, or JSON that does not describe an `ArchFile`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document's `"v"` field names a schema this build cannot read.
    #[error("Unsupported artifact format version: {0:?}")]
    UnsupportedVersion(String),
}

impl ArtifactError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A failed build; every variant names the source file it originated in.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The source file could not be read.
    #[error("Failed to read '{}': {source}", .file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Lexing or parsing failed.
    #[error("Parse error in '{}': {source}", .file.display())]
    Syntax {
        file: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// Semantic analysis found one or more errors.
    #[error("Semantic errors in '{}':{}", .file.display(), bullet_list(.errors))]
    Semantic {
        file: PathBuf,
        errors: Vec<SemanticError>,
    },

    /// An import resolved to a path with no source file.
    #[error(
        "Dependency '{import}' not found (expected: '{}') required by '{}'",
        .expected.display(),
        .file.display()
    )]
    DependencyNotFound {
        file: PathBuf,
        import: String,
        expected: PathBuf,
    },

    /// The import graph has a cycle; `cycle` starts and ends with the same key.
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { file: PathBuf, cycle: Vec<String> },

    /// A `@repo/...` import names a repository absent from the import map.
    #[error(
        "Remote import '{import}' in '{}' cannot be resolved: repository '{repo}' is not configured",
        .file.display()
    )]
    RemoteImportUnresolvable {
        file: PathBuf,
        import: String,
        repo: String,
    },

    /// A bare import with neither a matching mnemonic nor a workspace root.
    #[error(
        "Import '{import}' in '{}' cannot be resolved: no workspace root configured",
        .file.display()
    )]
    UnresolvableImport { file: PathBuf, import: String },

    /// The compiled artifact could not be written.
    #[error("Failed to write artifact for '{}': {source}", .file.display())]
    Artifact {
        file: PathBuf,
        #[source]
        source: ArtifactError,
    },
}

impl CompilerError {
    /// The source file the failure originated in.
    pub fn file(&self) -> &Path {
        match self {
            Self::Io { file, .. }
            | Self::Syntax { file, .. }
            | Self::Semantic { file, .. }
            | Self::DependencyNotFound { file, .. }
            | Self::CircularDependency { file, .. }
            | Self::RemoteImportUnresolvable { file, .. }
            | Self::UnresolvableImport { file, .. }
            | Self::Artifact { file, .. } => file,
        }
    }
}

fn bullet_list(errors: &[SemanticError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  - {}", e.message))
        .collect()
}
