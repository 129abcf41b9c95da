//! Fixtures shared by the `ocrlabel-core` integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use ocrlabel_core::{LabelStore, StoreConfig};
use tempfile::TempDir;

pub fn data_dir() -> (TempDir, PathBuf) {
    let temp = tempfile::tempdir().expect("create temp data dir");
    let root = temp
        .path()
        .canonicalize()
        .expect("canonicalize temp data dir");
    (temp, root)
}

pub fn write_image(root: &Path, name: &str) {
    std::fs::write(root.join(name), b"\xff\xd8\xff").expect("write fixture image");
}

pub fn write_sidecar(root: &Path, name: &str, label: &str) {
    std::fs::write(root.join(name), label).expect("write fixture sidecar");
}

pub fn open_store(root: &Path) -> LabelStore {
    LabelStore::open(&StoreConfig {
        data_dir: root.to_path_buf(),
        label_file: "label.txt".to_string(),
    })
    .expect("open label store")
}

pub fn read_index(store: &LabelStore) -> String {
    std::fs::read_to_string(store.index_path()).expect("read label index")
}
