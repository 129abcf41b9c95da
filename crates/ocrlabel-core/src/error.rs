use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("label store unavailable at {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid filename path: {0}")]
    InvalidPath(String),

    #[error("unsupported image extension: {0}")]
    UnsupportedExtension(String),

    #[error("image not found in data directory: {0}")]
    ImageNotFound(String),

    #[error("label not found: {0}")]
    LabelNotFound(String),

    #[error("label for {0} must not contain line breaks")]
    InvalidLabel(String),
}

impl CoreError {
    /// Wrap a filesystem failure at `path` as `StoreUnavailable`.
    pub(crate) fn unavailable(path: &Path) -> impl FnOnce(std::io::Error) -> CoreError + '_ {
        move |source| CoreError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }
}
