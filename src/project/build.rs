//! Incremental, import-aware compilation
//!
//! ## Flow
//!
//! ```text
//! compile_files(entries)
//!   └─ for each entry: compile_unit(key, path)
//!        ├─ cached artifact newer than source?  ─┐
//!        │     walk its imports (same session)  │ fresh → reuse
//!        │     any dependency rebuilt / newer?  ┘ stale → fall through
//!        ├─ parse
//!        ├─ compile_unit(dep) for every import (post-order)
//!        ├─ analyze with the compiled dependencies
//!        └─ stamp qualified names, write artifact
//! ```
//!
//! A [`CompilationSession`] owns all per-call state: the compiled units
//! and the stack of units in progress. Re-entering a unit on that stack is a
//! circular import.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info, warn};

use super::artifact::{artifact_path, read_artifact, write_artifact};
use super::error::CompilerError;
use super::file_loader::load_source;
use super::import_map::{ImportMap, ResolveError, ResolvedImport, absolute};
use crate::model::ArchFile;
use crate::parser::parse;
use crate::semantic::{ResolvedImports, analyze};

/// Compile `entry_files` and everything they import.
///
/// Returns every compiled unit keyed by canonical key, dependencies before
/// their dependents. The first failure anywhere in the import closure fails
/// the whole call.
pub fn compile_files<P: AsRef<Path>>(
    entry_files: &[P],
    build_dir: &Path,
    import_map: &ImportMap,
) -> Result<IndexMap<String, ArchFile>, CompilerError> {
    let mut session = CompilationSession::new(build_dir, import_map);
    for entry in entry_files {
        session.compile_entry(entry.as_ref())?;
    }
    let compiled = session.into_compiled();
    info!(units = compiled.len(), "compilation finished");
    Ok(compiled)
}

/// A compiled unit and how this session obtained it.
#[derive(Debug)]
struct Unit {
    file: ArchFile,
    /// Parsed and written in this session rather than loaded from cache.
    rebuilt: bool,
    artifact_modified: Option<SystemTime>,
}

/// State of one top-level compile request.
#[derive(Debug)]
pub struct CompilationSession {
    build_dir: PathBuf,
    import_map: ImportMap,
    compiled: IndexMap<String, Unit>,
    in_progress: IndexSet<String>,
}

impl CompilationSession {
    pub fn new(build_dir: &Path, import_map: &ImportMap) -> Self {
        Self {
            build_dir: absolute(build_dir),
            import_map: import_map.absolutized(),
            compiled: IndexMap::new(),
            in_progress: IndexSet::new(),
        }
    }

    /// Compile one entry file; a no-op when it was already compiled.
    ///
    /// Returns the unit's canonical key.
    pub fn compile_entry(&mut self, path: &Path) -> Result<String, CompilerError> {
        let path = absolute(path);
        let key = match self.import_map.canonical_key(&path) {
            Some(key) => key,
            None => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!(
                    file = %path.display(),
                    key = %stem,
                    "entry file is outside every import base; keying by file stem"
                );
                stem
            }
        };
        self.compile_unit(&key, &path)?;
        Ok(key)
    }

    pub fn compiled(&self, key: &str) -> Option<&ArchFile> {
        self.compiled.get(key).map(|unit| &unit.file)
    }

    pub fn into_compiled(self) -> IndexMap<String, ArchFile> {
        self.compiled
            .into_iter()
            .map(|(key, unit)| (key, unit.file))
            .collect()
    }

    // ========================================================================
    // Units
    // ========================================================================

    fn compile_unit(&mut self, key: &str, source: &Path) -> Result<(), CompilerError> {
        if self.compiled.contains_key(key) {
            return Ok(());
        }
        if let Some(start) = self.in_progress.get_index_of(key) {
            let mut cycle: Vec<String> = self.in_progress.iter().skip(start).cloned().collect();
            cycle.push(key.to_string());
            return Err(CompilerError::CircularDependency {
                file: source.to_path_buf(),
                cycle,
            });
        }

        self.in_progress.insert(key.to_string());
        let unit = self.load_or_build(key, source);
        self.in_progress.pop();

        self.compiled.insert(key.to_string(), unit?);
        Ok(())
    }

    fn load_or_build(&mut self, key: &str, source: &Path) -> Result<Unit, CompilerError> {
        let artifact = artifact_path(&self.build_dir, key);
        if let Some(unit) = self.try_cached(key, source, &artifact)? {
            return Ok(unit);
        }
        self.build(key, source, &artifact)
    }

    /// The cached unit when its artifact is fresh, else `None`.
    ///
    /// Unreadable artifacts and moved dependencies are treated as stale.
    /// Errors from compiling the cached unit's dependencies propagate.
    fn try_cached(
        &mut self,
        key: &str,
        source: &Path,
        artifact: &Path,
    ) -> Result<Option<Unit>, CompilerError> {
        let Some(artifact_modified) = modified(artifact) else {
            debug!(unit = key, "cache miss: no artifact");
            return Ok(None);
        };
        let source_modified = fs::metadata(source)
            .and_then(|m| m.modified())
            .map_err(|e| CompilerError::Io {
                file: source.to_path_buf(),
                source: e,
            })?;
        if artifact_modified <= source_modified {
            debug!(unit = key, "cache stale: source is newer");
            return Ok(None);
        }

        let file = match read_artifact(artifact) {
            Ok(file) => file,
            Err(e) => {
                debug!(unit = key, error = %e, "cache stale: artifact unreadable");
                return Ok(None);
            }
        };

        for import in &file.imports {
            let Ok(dep) = self.import_map.resolve(&import.source_path) else {
                debug!(unit = key, import = %import.source_path, "cache stale: import no longer resolves");
                return Ok(None);
            };
            if !dep.path.is_file() {
                debug!(unit = key, import = %import.source_path, "cache stale: dependency moved");
                return Ok(None);
            }
            self.compile_unit(&dep.canonical_key, &dep.path)?;
            if self.invalidates(&dep.canonical_key, artifact_modified) {
                debug!(unit = key, dependency = %dep.canonical_key, "cache stale: dependency changed");
                return Ok(None);
            }
        }

        debug!(unit = key, "cache hit");
        Ok(Some(Unit {
            file,
            rebuilt: false,
            artifact_modified: Some(artifact_modified),
        }))
    }

    /// Whether dependency `dep` forces a rebuild of an artifact written at `artifact_modified`.
    fn invalidates(&self, dep: &str, artifact_modified: SystemTime) -> bool {
        match self.compiled.get(dep) {
            Some(unit) => {
                unit.rebuilt
                    || unit
                        .artifact_modified
                        .is_some_and(|t| t > artifact_modified)
            }
            None => true,
        }
    }

    fn build(&mut self, key: &str, source: &Path, artifact: &Path) -> Result<Unit, CompilerError> {
        let text = load_source(source)?;
        let mut file = parse(&text).map_err(|e| CompilerError::Syntax {
            file: source.to_path_buf(),
            source: e,
        })?;

        let mut dependencies: Vec<(String, String)> = Vec::with_capacity(file.imports.len());
        for import in &file.imports {
            let dep = self.resolve_import(source, &import.source_path)?;
            if !dep.path.is_file() {
                return Err(CompilerError::DependencyNotFound {
                    file: source.to_path_buf(),
                    import: import.source_path.clone(),
                    expected: dep.path,
                });
            }
            debug!(unit = key, dependency = %dep.canonical_key, path = %dep.path.display(), "resolved import");
            self.compile_unit(&dep.canonical_key, &dep.path)?;
            dependencies.push((import.source_path.clone(), dep.canonical_key));
        }

        let errors = if dependencies.is_empty() {
            analyze(&file, None)
        } else {
            let resolved: ResolvedImports<'_> = dependencies
                .iter()
                .filter_map(|(path, dep)| {
                    self.compiled
                        .get(dep)
                        .map(|unit| (path.clone(), &unit.file))
                })
                .collect();
            analyze(&file, Some(&resolved))
        };
        if !errors.is_empty() {
            return Err(CompilerError::Semantic {
                file: source.to_path_buf(),
                errors,
            });
        }

        file.assign_qualified_names(key);
        write_artifact(&file, artifact).map_err(|e| CompilerError::Artifact {
            file: source.to_path_buf(),
            source: e,
        })?;

        Ok(Unit {
            file,
            rebuilt: true,
            artifact_modified: modified(artifact),
        })
    }

    fn resolve_import(&self, source: &Path, import: &str) -> Result<ResolvedImport, CompilerError> {
        self.import_map.resolve(import).map_err(|e| match e {
            ResolveError::UnknownRepository(repo) => CompilerError::RemoteImportUnresolvable {
                file: source.to_path_buf(),
                import: import.to_string(),
                repo,
            },
            ResolveError::NoRoot => CompilerError::UnresolvableImport {
                file: source.to_path_buf(),
                import: import.to_string(),
            },
        })
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
