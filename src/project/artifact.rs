//! Compiled-artifact codec
//!
//! One compact JSON document per compiled file:
//!
//! ```text
//! {"v":"1","file":{"imports":[...],"types":[{"name":"Order","fields":[
//!     {"name":"lines","type":{"k":"list","element":{"k":"named","name":"Line"}}}]}], ...}}
//! ```
//!
//! Every type reference carries a `"k"` tag, so decoding needs no outside
//! type information. Writes land in a temporary file next to the target and
//! are renamed into place; readers never see a partial artifact.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::error::ArtifactError;
use crate::base::constants::{ARTIFACT_EXT, ARTIFACT_FORMAT_VERSION, PATH_SEPARATOR};
use crate::model::ArchFile;

#[derive(Serialize)]
struct DocumentRef<'a> {
    v: &'a str,
    file: &'a ArchFile,
}

/// Read first, so an unknown version is reported before the body is decoded.
#[derive(Deserialize)]
struct Header {
    v: String,
}

#[derive(Deserialize)]
struct Document {
    file: ArchFile,
}

pub fn serialize(file: &ArchFile) -> Result<String, ArtifactError> {
    let doc = DocumentRef {
        v: ARTIFACT_FORMAT_VERSION,
        file,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a document produced by [`serialize`].
///
/// Type references nest without bound, so decoding grows the stack on
/// demand instead of applying serde_json's recursion limit.
pub fn deserialize(data: &str) -> Result<ArchFile, ArtifactError> {
    let header: Header = decode(data)?;
    if header.v != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion(header.v));
    }
    let doc: Document = decode(data)?;
    Ok(doc.file)
}

fn decode<T: DeserializeOwned>(data: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(data);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Write `file` to `path`, creating parent directories as needed.
pub fn write_artifact(file: &ArchFile, path: &Path) -> Result<(), ArtifactError> {
    let data = serialize(file)?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| ArtifactError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| ArtifactError::io(parent, e))?;
    tmp.write_all(data.as_bytes())
        .map_err(|e| ArtifactError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| ArtifactError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = data.len(), "artifact written");
    Ok(())
}

pub fn read_artifact(path: &Path) -> Result<ArchFile, ArtifactError> {
    let data = fs::read_to_string(path).map_err(|e| ArtifactError::io(path, e))?;
    deserialize(&data)
}

/// Where the artifact of the unit `canonical_key` lives under `build_dir`.
///
/// Key segments map one-to-one onto directories.
pub fn artifact_path(build_dir: &Path, canonical_key: &str) -> PathBuf {
    let mut path = build_dir.to_path_buf();
    let mut segments = canonical_key.split(PATH_SEPARATOR).peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.{ARTIFACT_EXT}"));
        }
    }
    path
}
