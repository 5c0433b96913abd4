//! Workspace configuration (`.archml-workspace.yaml`)
//!
//! ```yaml
//! build-directory: build
//! source-imports:
//!   - name: shared
//!     local-path: libs/shared
//!   - name: payments
//!     git-repository: https://example.com/payments.git
//!     revision: main
//! ```
//!
//! Turning the configuration into an [`ImportMap`] needs the checkout
//! directory of every git repository; fetching them is the caller's job.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

use super::import_map::ImportMap;
use crate::base::constants::WORKSPACE_CONFIG_FILE;

#[derive(Debug, Error)]
pub enum WorkspaceConfigError {
    #[error("Cannot read workspace config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML in {label}: {source}")]
    Yaml {
        label: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Structurally wrong configuration; the message names the location.
    #[error("{0}")]
    Invalid(String),

    /// A git source import with no checkout supplied.
    #[error("No checkout supplied for git repository '{0}'")]
    MissingCheckout(String),
}

/// One entry of `source-imports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceImport {
    Local {
        name: String,
        local_path: String,
    },
    Git {
        name: String,
        git_repository: String,
        revision: String,
    },
}

impl SourceImport {
    pub fn name(&self) -> &str {
        match self {
            Self::Local { name, .. } | Self::Git { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Compiler output directory, relative to the workspace root.
    pub build_directory: String,
    pub source_imports: Vec<SourceImport>,
}

impl WorkspaceConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, WorkspaceConfigError> {
        let text = fs::read_to_string(path).map_err(|source| WorkspaceConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse_config(&text, &path.display().to_string())
    }

    /// The configuration file of the workspace rooted at `root`, if any.
    pub fn find(root: &Path) -> Option<PathBuf> {
        let path = root.join(WORKSPACE_CONFIG_FILE);
        path.is_file().then_some(path)
    }

    pub fn from_yaml(text: &str) -> Result<Self, WorkspaceConfigError> {
        parse_config(text, "<string>")
    }

    /// Build directory resolved against the workspace root.
    pub fn build_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.build_directory)
    }

    /// Build the import map of the workspace rooted at `root`.
    ///
    /// - `""` maps to `root`; each local import to `root/<local-path>`.
    /// - Each git import `name` maps `@name` to `remote_checkouts[name]`.
    /// - When a checkout carries its own workspace file, its local imports
    ///   are added as `@name/<mnemonic>`.
    pub fn import_map(
        &self,
        root: &Path,
        remote_checkouts: &FxHashMap<String, PathBuf>,
    ) -> Result<ImportMap, WorkspaceConfigError> {
        let mut map = ImportMap::new().with_root(root);

        for import in &self.source_imports {
            match import {
                SourceImport::Local { name, local_path } => {
                    map.insert(name.as_str(), root.join(local_path));
                }
                SourceImport::Git { name, .. } => {
                    let checkout = remote_checkouts
                        .get(name)
                        .ok_or_else(|| WorkspaceConfigError::MissingCheckout(name.clone()))?;
                    map = map.with_remote(name, checkout.clone());

                    let Some(nested) = Self::find(checkout) else {
                        continue;
                    };
                    let nested = Self::load(&nested)?;
                    for inner in &nested.source_imports {
                        if let SourceImport::Local {
                            name: mnemonic,
                            local_path,
                        } = inner
                        {
                            debug!(repo = %name, mnemonic = %mnemonic, "remote mnemonic");
                            map = map.with_remote_mnemonic(name, mnemonic, checkout.join(local_path));
                        }
                    }
                }
            }
        }
        Ok(map)
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_config(text: &str, label: &str) -> Result<WorkspaceConfig, WorkspaceConfigError> {
    let value: Value = serde_yaml::from_str(text).map_err(|source| WorkspaceConfigError::Yaml {
        label: label.to_string(),
        source,
    })?;
    let Value::Mapping(map) = value else {
        return Err(invalid(format!(
            "{label}: workspace config must be a YAML mapping"
        )));
    };

    let build_directory = require_string(&map, "build-directory", label)?;

    let mut source_imports = Vec::new();
    if let Some(raw) = map.get("source-imports") {
        let Value::Sequence(entries) = raw else {
            return Err(invalid(format!("{label}: 'source-imports' must be a list")));
        };
        for (index, entry) in entries.iter().enumerate() {
            source_imports.push(parse_source_import(entry, index, label)?);
        }
    }

    Ok(WorkspaceConfig {
        build_directory,
        source_imports,
    })
}

fn parse_source_import(
    entry: &Value,
    index: usize,
    label: &str,
) -> Result<SourceImport, WorkspaceConfigError> {
    let location = format!("{label}: source-imports[{index}]");
    let Value::Mapping(map) = entry else {
        return Err(invalid(format!("{location} must be a YAML mapping")));
    };

    let name = require_string(map, "name", &location)?;
    let has_local = map.contains_key("local-path");
    let has_git = map.contains_key("git-repository");

    match (has_local, has_git) {
        (true, true) => Err(invalid(format!(
            "{location} '{name}': must specify either 'local-path' or 'git-repository', not both"
        ))),
        (false, false) => Err(invalid(format!(
            "{location} '{name}': must specify either 'local-path' or 'git-repository'"
        ))),
        (true, false) => Ok(SourceImport::Local {
            local_path: require_string(map, "local-path", &location)?,
            name,
        }),
        (false, true) => Ok(SourceImport::Git {
            git_repository: require_string(map, "git-repository", &location)?,
            revision: require_string(map, "revision", &location)?,
            name,
        }),
    }
}

fn require_string(map: &Mapping, key: &str, location: &str) -> Result<String, WorkspaceConfigError> {
    match map.get(key) {
        None => Err(invalid(format!(
            "{location}: missing required field '{key}'"
        ))),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid(format!("{location}: '{key}' must be a string"))),
    }
}

fn invalid(message: String) -> WorkspaceConfigError {
    WorkspaceConfigError::Invalid(message)
}
