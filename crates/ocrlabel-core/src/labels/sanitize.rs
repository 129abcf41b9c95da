//! Filename sanitisation: turns caller-supplied names into basenames and
//! confirms they resolve to a direct child of the data directory.

use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Image extensions accepted for label writes, compared case-insensitively.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Extension of per-image label files.
pub const SIDECAR_EXTENSION: &str = "txt";

/// A name that passed [`resolve_image_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub name: String,
    pub path: PathBuf,
}

impl ResolvedImage {
    /// Path of the sidecar label file that belongs to this image.
    pub fn sidecar_path(&self) -> PathBuf {
        self.path.with_extension(SIDECAR_EXTENSION)
    }
}

/// Keep only the final path segment of `raw`, treating both `/` and `\`
/// as separators. `.` and `..` collapse to the empty string.
pub fn safe_basename(raw: &str) -> &str {
    match raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default() {
        "." | ".." => "",
        name => name,
    }
}

pub fn has_allowed_image_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

/// Validate `raw` as an image name directly inside `root`.
///
/// `root` must already be canonical. The name must be a plain basename
/// without tabs or line breaks: anything carrying directory components is
/// rejected rather than silently reduced, and an existing entry is followed through symlinks
/// so links pointing outside `root` are rejected too. The image itself
/// does not have to exist.
pub fn resolve_image_path(root: &Path, raw: &str) -> Result<ResolvedImage, CoreError> {
    let name = safe_basename(raw);
    if name.is_empty() || name != raw {
        return Err(CoreError::InvalidPath(raw.to_string()));
    }
    // Names are index keys; the index is tab-separated and line-oriented.
    if name.contains(['\t', '\n', '\r']) {
        return Err(CoreError::InvalidPath(raw.to_string()));
    }

    let candidate = root.join(name);
    let resolved = match candidate.canonicalize() {
        Ok(resolved) => resolved,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => candidate.clone(),
        Err(err) if err.kind() == std::io::ErrorKind::InvalidInput => {
            return Err(CoreError::InvalidPath(raw.to_string()));
        }
        Err(err) => return Err(CoreError::unavailable(&candidate)(err)),
    };
    if resolved.parent() != Some(root) {
        return Err(CoreError::InvalidPath(raw.to_string()));
    }

    if !has_allowed_image_extension(name) {
        return Err(CoreError::UnsupportedExtension(name.to_string()));
    }

    Ok(ResolvedImage {
        name: name.to_string(),
        path: candidate,
    })
}
