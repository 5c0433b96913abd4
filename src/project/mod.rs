//! Build orchestration: import resolution, compiled artifacts and
//! incremental compilation of import closures.

mod artifact;
mod build;
mod error;
pub mod file_loader;
mod import_map;
#[cfg(feature = "workspace")]
mod workspace_config;

pub use artifact::{artifact_path, deserialize, read_artifact, serialize, write_artifact};
pub use build::{CompilationSession, compile_files};
pub use error::{ArtifactError, CompilerError};
pub use import_map::{ImportMap, ResolveError, ResolvedImport};
#[cfg(feature = "workspace")]
pub use workspace_config::{SourceImport, WorkspaceConfig, WorkspaceConfigError};

#[cfg(test)]
mod tests;
