//! Shared test helpers for `ocrlabel-core` unit tests: temporary data
//! directories, fixture files and store construction.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::labels::{LabelStore, StoreConfig};

/// A fresh temporary data directory and its canonical path. Keep the
/// `TempDir` alive for as long as the path is used.
pub fn data_dir() -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("create temp data dir");
    let root = temp
        .path()
        .canonicalize()
        .expect("canonicalize temp data dir");
    (temp, root)
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture file");
}

/// Placeholder image bytes; the store never decodes images.
pub fn write_image(dir: &Path, name: &str) {
    std::fs::write(dir.join(name), b"\x89IMG").expect("write fixture image");
}

pub fn open_store(root: &Path) -> LabelStore {
    LabelStore::open(&StoreConfig {
        data_dir: root.to_path_buf(),
        label_file: "label.txt".to_string(),
    })
    .expect("open label store")
}
