//! Shared fixtures: a throwaway workspace on disk with controllable mtimes.
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use archml::project::artifact_path;
use archml::{ArchFile, CompilerError, ImportMap, compile_files};
use indexmap::IndexMap;
use tempfile::TempDir;

pub const HOUR: u64 = 3600;

/// Sources are written an hour in the past so artifacts written by a
/// compile are always strictly newer.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.path("build")
    }

    pub fn root_map(&self) -> ImportMap {
        ImportMap::new().with_root(self.root())
    }

    pub fn write(&self, rel: &str, source: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, source).unwrap();
        set_age(&path, HOUR);
        path
    }

    pub fn artifact(&self, key: &str) -> PathBuf {
        artifact_path(&self.build_dir(), key)
    }

    pub fn compile(&self, entries: &[&str]) -> Result<IndexMap<String, ArchFile>, CompilerError> {
        self.compile_with(entries, &self.root_map())
    }

    pub fn compile_with(
        &self,
        entries: &[&str],
        map: &ImportMap,
    ) -> Result<IndexMap<String, ArchFile>, CompilerError> {
        let paths: Vec<PathBuf> = entries.iter().map(|e| self.path(e)).collect();
        compile_files(&paths, &self.build_dir(), map)
    }
}

/// Set the mtime of `path` to `secs` seconds ago.
pub fn set_age(path: &Path, secs: u64) {
    set_modified(path, SystemTime::now() - Duration::from_secs(secs));
}

pub fn set_modified(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

pub fn modified(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}
