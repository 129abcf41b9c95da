//! The aggregate label index: a flat text file of `name\tlabel` lines.
//!
//! The index is a projection of the sidecar files. It is read on every
//! lookup, rebuilt from sidecars when missing, and always rewritten in
//! full through a temp-file-then-rename swap so readers never observe a
//! half-written file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

use super::reconcile::rebuild;
use super::sanitize::safe_basename;
use super::types::LabelMap;

/// Handle on the index file. Loading may rebuild and saving rewrites the
/// file, so callers outside `LabelStore` must hold its write lock.
pub(crate) struct LabelIndex {
    root: PathBuf,
    file_name: String,
    path: PathBuf,
}

impl LabelIndex {
    pub fn new(root: &Path, file_name: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            file_name: file_name.to_string(),
            path: root.join(file_name),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the index. A missing index is first rebuilt from
    /// the sidecar files, then read back from disk.
    pub fn load(&self) -> Result<LabelMap, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(parse_index(&content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.path.display(),
                    "label index missing; rebuilding from sidecar files"
                );
                rebuild(self)?;
                let content =
                    std::fs::read_to_string(&self.path).map_err(CoreError::unavailable(&self.path))?;
                Ok(parse_index(&content))
            }
            Err(err) => Err(CoreError::unavailable(&self.path)(err)),
        }
    }

    /// Replace the index with `labels`, sorted by name.
    pub fn save(&self, labels: &LabelMap) -> Result<(), CoreError> {
        write_atomic(&self.path, serialize_index(labels).as_bytes())
    }
}

/// Parse index content. Lines without a tab separator are skipped, and
/// each name is reduced to its basename before use as a key. When a name
/// repeats, the later line wins.
pub fn parse_index(content: &str) -> LabelMap {
    content
        .lines()
        .enumerate()
        .fold(LabelMap::new(), |mut map, (line_num, line)| {
            let Some((raw_name, label)) = line.split_once('\t') else {
                tracing::debug!(line = line_num + 1, "skipping index line without tab separator");
                return map;
            };

            let name = safe_basename(raw_name);
            if name.is_empty() {
                tracing::debug!(line = line_num + 1, "skipping index line with empty file name");
                return map;
            }

            if map.contains_key(name) {
                tracing::warn!(
                    line = line_num + 1,
                    image = name,
                    "duplicate index entry overwrites previous value"
                );
            }
            map.insert(name.to_string(), label.to_string());
            map
        })
}

/// Serialize to `name\tlabel` lines in ordinal name order, joined with
/// `\n` and without a trailing newline.
pub fn serialize_index(labels: &LabelMap) -> String {
    labels
        .iter()
        .map(|(name, label)| format!("{name}\t{label}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `contents` to a temp file next to `path`, then rename it over
/// `path`.
pub(super) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(CoreError::unavailable(dir))?;
    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(CoreError::unavailable(temp.path()))?;
    temp.persist(path)
        .map_err(|err| CoreError::unavailable(path)(err.error))?;
    Ok(())
}
