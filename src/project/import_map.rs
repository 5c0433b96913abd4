//! Import resolution: logical import paths to source files.
//!
//! An [`ImportMap`] maps keys to base directories:
//!
//! | Key | Serves |
//! |---|---|
//! | `""` | bare imports, relative to the workspace root |
//! | `mnemonic` | `mnemonic/rest` |
//! | `@repo` | `@repo/rest` |
//! | `@repo/mnemonic` | `@repo/mnemonic/rest`, tried before `@repo` |
//!
//! Resolving a path yields its canonical key (the key-prefixed path of the
//! file without extension), which names both the compiled unit and its
//! artifact under the build directory.

use std::path::{Component as PathComponent, Path, PathBuf};

use indexmap::IndexMap;

use crate::base::constants::{PATH_SEPARATOR, REMOTE_PREFIX, ROOT_IMPORT_KEY, SOURCE_EXT};

/// Key to base directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    entries: IndexMap<String, PathBuf>,
}

/// A logical import path resolved against an [`ImportMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    /// The import-map key that matched (`""` for the root).
    pub key: String,
    /// Canonical unit key, e.g. `shared/types` or `@payments/api/v1`.
    pub canonical_key: String,
    /// Expected location of the source file; it may not exist.
    pub path: PathBuf,
}

/// Why a logical import path matched no import-map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `@repo/...` with neither `@repo/<first>` nor `@repo` configured.
    UnknownRepository(String),
    /// A bare path and no root entry.
    NoRoot,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve bare imports from `root`.
    pub fn with_root(self, root: impl Into<PathBuf>) -> Self {
        self.with(ROOT_IMPORT_KEY, root)
    }

    pub fn with_mnemonic(self, mnemonic: &str, base: impl Into<PathBuf>) -> Self {
        self.with(mnemonic, base)
    }

    /// Serve `@repo/...` imports from a checkout.
    pub fn with_remote(self, repo: &str, checkout: impl Into<PathBuf>) -> Self {
        self.with(&remote_key(repo), checkout)
    }

    /// Serve `@repo/mnemonic/...` imports from a mnemonic inside a checkout.
    pub fn with_remote_mnemonic(
        self,
        repo: &str,
        mnemonic: &str,
        base: impl Into<PathBuf>,
    ) -> Self {
        self.with(
            &format!("{}{PATH_SEPARATOR}{mnemonic}", remote_key(repo)),
            base,
        )
    }

    fn with(mut self, key: &str, base: impl Into<PathBuf>) -> Self {
        self.insert(key, base);
        self
    }

    /// Insert or replace an entry under a raw key.
    pub fn insert(&mut self, key: impl Into<String>, base: impl Into<PathBuf>) {
        self.entries.insert(key.into(), base.into());
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    pub fn root(&self) -> Option<&Path> {
        self.get(ROOT_IMPORT_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every base made absolute against the current directory.
    pub(crate) fn absolutized(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), absolute(v)))
                .collect(),
        }
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve a logical import path such as `shared/types`,
    /// `mylib/types` or `@repo/lib/types`.
    pub fn resolve(&self, import_path: &str) -> Result<ResolvedImport, ResolveError> {
        let segments: Vec<&str> = import_path.split(PATH_SEPARATOR).collect();

        let (key, base, rest) = match segments.split_first() {
            Some((first, rest)) if first.starts_with(REMOTE_PREFIX) => {
                self.select_remote(first, rest)?
            }
            _ => self.select_local(&segments)?,
        };

        let mut path = base.to_path_buf();
        if let Some((last, dirs)) = rest.split_last() {
            for dir in dirs {
                path.push(dir);
            }
            path.push(format!("{last}.{SOURCE_EXT}"));
        }

        Ok(ResolvedImport {
            canonical_key: join_key(&key, rest),
            key,
            path,
        })
    }

    /// `@repo/<first>` when configured and something follows it, else `@repo`.
    fn select_remote<'p>(
        &self,
        repo: &str,
        rest: &'p [&'p str],
    ) -> Result<(String, &Path, &'p [&'p str]), ResolveError> {
        if let [first, tail @ ..] = rest {
            if !tail.is_empty() {
                let nested = format!("{repo}{PATH_SEPARATOR}{first}");
                if let Some(base) = self.get(&nested) {
                    return Ok((nested, base, tail));
                }
            }
        }
        match self.get(repo) {
            Some(base) => Ok((repo.to_string(), base, rest)),
            None => Err(ResolveError::UnknownRepository(
                repo.trim_start_matches(REMOTE_PREFIX).to_string(),
            )),
        }
    }

    /// A leading mnemonic segment when configured and something follows it,
    /// else the root.
    fn select_local<'p>(
        &self,
        segments: &'p [&'p str],
    ) -> Result<(String, &Path, &'p [&'p str]), ResolveError> {
        if let [first, tail @ ..] = segments {
            if !tail.is_empty() && !first.is_empty() {
                if let Some(base) = self.get(first) {
                    return Ok((first.to_string(), base, tail));
                }
            }
        }
        match self.root() {
            Some(base) => Ok((ROOT_IMPORT_KEY.to_string(), base, segments)),
            None => Err(ResolveError::NoRoot),
        }
    }

    // ========================================================================
    // Canonical keys of entry files
    // ========================================================================

    /// Canonical key of a source file under one of the bases.
    ///
    /// The deepest matching base wins. `None` when the file lies outside
    /// every base or its path still contains `.` or `..` components.
    pub fn canonical_key(&self, file: &Path) -> Option<String> {
        let (key, relative) = self
            .entries
            .iter()
            .filter_map(|(key, base)| {
                file.strip_prefix(base)
                    .ok()
                    .map(|rel| (key, base.components().count(), rel))
            })
            .max_by_key(|(_, depth, _)| *depth)
            .map(|(key, _, rel)| (key, rel))?;

        let relative = relative.with_extension("");
        let segments: Vec<&str> = relative
            .components()
            .map(|c| match c {
                PathComponent::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()?;
        if segments.is_empty() {
            return None;
        }
        Some(join_key(key, &segments))
    }
}

fn remote_key(repo: &str) -> String {
    format!("{REMOTE_PREFIX}{repo}")
}

fn join_key(key: &str, segments: &[&str]) -> String {
    let rest = segments.join(&PATH_SEPARATOR.to_string());
    if key.is_empty() {
        rest
    } else {
        format!("{key}{PATH_SEPARATOR}{rest}")
    }
}

/// `path` made absolute and lexically normalised, without touching the
/// filesystem. `.` is dropped and `..` removes the preceding component.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => {
                let last = normalized.components().next_back();
                let after_name = matches!(last, Some(PathComponent::Normal(_)));
                let at_root = matches!(
                    last,
                    Some(PathComponent::RootDir | PathComponent::Prefix(_))
                );
                if after_name {
                    normalized.pop();
                } else if !at_root {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
