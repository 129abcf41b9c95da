//! Sidecar reconciliation: rebuilds the aggregate index by scanning the
//! data directory (non-recursively) for per-image `.txt` label files.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

use super::index::LabelIndex;
use super::sanitize::{ALLOWED_IMAGE_EXTENSIONS, SIDECAR_EXTENSION};
use super::types::LabelMap;

/// Image extension assumed for a sidecar whose image is not on disk.
const FALLBACK_IMAGE_EXTENSION: &str = "jpg";

/// Rebuild the index file from the sidecars, overwriting whatever it held.
/// Returns the labels that were written.
pub(crate) fn rebuild(index: &LabelIndex) -> Result<LabelMap, CoreError> {
    let labels = collect_sidecars(index.root(), index.file_name())?;
    index.save(&labels)?;
    tracing::info!(
        path = %index.path().display(),
        entries = labels.len(),
        "rebuilt label index from sidecar files"
    );
    Ok(labels)
}

/// Read every sidecar in `root`, excluding the index file itself
/// (matched case-insensitively by name). Label text is trimmed. Any
/// unreadable sidecar fails the whole scan.
pub fn collect_sidecars(root: &Path, index_file_name: &str) -> Result<LabelMap, CoreError> {
    let mut files = std::fs::read_dir(root)
        .map_err(CoreError::unavailable(root))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(CoreError::unavailable(root))?;
    files.retain(|path| path.is_file());
    // Sorted so that two sidecars mapping to the same image resolve the
    // same way on every filesystem.
    files.sort();

    let images = images_by_stem(&files);
    files
        .iter()
        .filter(|path| is_sidecar(path, index_file_name))
        .try_fold(LabelMap::new(), |mut labels, path| {
            let content = std::fs::read_to_string(path).map_err(CoreError::unavailable(path))?;
            let Some(image_name) = image_name_for_sidecar(path, &images) else {
                return Ok(labels);
            };
            labels.insert(image_name, content.trim().to_string());
            Ok(labels)
        })
}

fn is_sidecar(path: &Path, index_file_name: &str) -> bool {
    let has_sidecar_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SIDECAR_EXTENSION));
    let is_index = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase() == index_file_name.to_lowercase())
        .unwrap_or(false);

    has_sidecar_ext && !is_index
}

/// Image files grouped by stem, each with the position of its extension
/// in `ALLOWED_IMAGE_EXTENSIONS` (compared case-insensitively).
fn images_by_stem(files: &[PathBuf]) -> HashMap<&OsStr, Vec<(usize, &Path)>> {
    files
        .iter()
        .filter_map(|path| {
            let ext = path.extension()?.to_str()?;
            let rank = ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .position(|allowed| allowed.eq_ignore_ascii_case(ext))?;
            Some((path.file_stem()?, (rank, path.as_path())))
        })
        .fold(HashMap::new(), |mut images, (stem, image)| {
            images.entry(stem).or_insert_with(Vec::new).push(image);
            images
        })
}

/// Image name a sidecar labels: the existing sibling whose extension comes
/// first among the allowed extensions, else `<stem>.jpg`.
fn image_name_for_sidecar(
    sidecar: &Path,
    images: &HashMap<&OsStr, Vec<(usize, &Path)>>,
) -> Option<String> {
    let existing = sidecar
        .file_stem()
        .and_then(|stem| images.get(stem))
        .and_then(|candidates| candidates.iter().min_by_key(|(rank, _)| *rank))
        .map(|(_, path)| path.to_path_buf());

    let image_path = match existing {
        Some(path) => {
            if path
                .extension()
                .is_some_and(|ext| !ext.eq_ignore_ascii_case(FALLBACK_IMAGE_EXTENSION))
            {
                tracing::debug!(
                    sidecar = %sidecar.display(),
                    image = %path.display(),
                    "matched sidecar to non-jpg image"
                );
            }
            path
        }
        None => sidecar.with_extension(FALLBACK_IMAGE_EXTENSION),
    };

    image_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
