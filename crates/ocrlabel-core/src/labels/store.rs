//! `LabelStore`, the orchestrator over sidecar files and the aggregate
//! index.
//!
//! One store instance is shared by every request handler. Anything that
//! writes the index or a sidecar runs under a store-wide write lock;
//! readers take no lock because every write is published by rename, so a
//! reader sees either the old index or the new one, never a partial file.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CoreError;

use super::index::{write_atomic, LabelIndex};
use super::query::query;
use super::reconcile::rebuild;
use super::sanitize::{resolve_image_path, safe_basename};
use super::types::{LabelEntry, LabelMap, LabelPage, LabelQuery, StoreConfig};

pub struct LabelStore {
    root: PathBuf,
    index: LabelIndex,
    write_lock: Mutex<()>,
}

impl LabelStore {
    /// Open the store over `config.data_dir`.
    ///
    /// The data directory must exist and be a directory; it is
    /// canonicalized so every containment check compares against the
    /// real path. A missing index is reconciled from sidecars once here.
    pub fn open(config: &StoreConfig) -> Result<Self, CoreError> {
        let label_file = config.label_file.as_str();
        if label_file.is_empty() || safe_basename(label_file) != label_file {
            return Err(CoreError::InvalidPath(label_file.to_string()));
        }

        let root = ensure_data_dir(&config.data_dir)?;
        let store = Self {
            index: LabelIndex::new(&root, label_file),
            root,
            write_lock: Mutex::new(()),
        };

        if !store.index.exists() {
            let _guard = store.lock_writes();
            rebuild(&store.index)?;
        }

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> &Path {
        self.index.path()
    }

    /// Whether the data directory is still present.
    pub fn is_available(&self) -> bool {
        self.root.is_dir()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current contents of the index. Only a missing index (which triggers
    /// a rebuild) takes the write lock.
    pub fn snapshot(&self) -> Result<LabelMap, CoreError> {
        if self.index.exists() {
            return self.index.load();
        }
        let _guard = self.lock_writes();
        self.index.load()
    }

    /// Look up the label for `raw_name`. Only the index is consulted; the
    /// image does not need to exist.
    pub fn get_label(&self, raw_name: &str) -> Result<LabelEntry, CoreError> {
        let name = safe_basename(raw_name);
        let mut labels = self.snapshot()?;
        let label = labels
            .remove(name)
            .ok_or_else(|| CoreError::LabelNotFound(raw_name.to_string()))?;
        Ok(LabelEntry {
            name: name.to_string(),
            label,
        })
    }

    pub fn list(&self, params: &LabelQuery) -> Result<LabelPage, CoreError> {
        Ok(query(&self.snapshot()?, params))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Store `text` as the label for an existing image: write the sidecar
    /// verbatim, then rewrite the index with the entry upserted.
    pub fn set_label(&self, raw_name: &str, text: &str) -> Result<LabelEntry, CoreError> {
        let image = resolve_image_path(&self.root, raw_name)?;
        if text.contains(['\n', '\r']) {
            return Err(CoreError::InvalidLabel(image.name));
        }

        let sidecar = image.sidecar_path();
        let index_name = self.index.file_name().to_lowercase();
        if sidecar
            .file_name()
            .is_some_and(|name| name.to_string_lossy().to_lowercase() == index_name)
        {
            // The sidecar would overwrite the index itself.
            return Err(CoreError::InvalidPath(image.name));
        }

        if !image.path.is_file() {
            return Err(CoreError::ImageNotFound(image.name));
        }

        let _guard = self.lock_writes();
        let mut labels = self.index.load()?;
        write_atomic(&sidecar, text.as_bytes())?;
        labels.insert(image.name.clone(), text.to_string());
        self.index.save(&labels)?;

        tracing::info!(image = %image.name, "label updated");
        Ok(LabelEntry {
            name: image.name,
            label: text.to_string(),
        })
    }

    /// Rebuild the index from sidecars, discarding its current content.
    pub fn refresh(&self) -> Result<(), CoreError> {
        let _guard = self.lock_writes();
        rebuild(&self.index)?;
        Ok(())
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn ensure_data_dir(dir: &Path) -> Result<PathBuf, CoreError> {
    let metadata = std::fs::metadata(dir).map_err(CoreError::unavailable(dir))?;
    if !metadata.is_dir() {
        return Err(CoreError::StoreUnavailable {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }
    dir.canonicalize().map_err(CoreError::unavailable(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{data_dir, open_store, write_file, write_image};

    #[test]
    fn open_requires_existing_directory() {
        let (_temp, root) = data_dir();
        let missing = StoreConfig {
            data_dir: root.join("missing"),
            ..StoreConfig::default()
        };
        assert!(matches!(
            LabelStore::open(&missing),
            Err(CoreError::StoreUnavailable { .. })
        ));

        write_file(&root, "plain-file", "");
        let not_dir = StoreConfig {
            data_dir: root.join("plain-file"),
            ..StoreConfig::default()
        };
        assert!(matches!(
            LabelStore::open(&not_dir),
            Err(CoreError::StoreUnavailable { .. })
        ));
    }

    #[test]
    fn open_rejects_nested_label_file_name() {
        let (_temp, root) = data_dir();
        let config = StoreConfig {
            data_dir: root,
            label_file: "../label.txt".to_string(),
        };
        assert!(matches!(
            LabelStore::open(&config),
            Err(CoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn open_reconciles_missing_index_once() {
        let (_temp, root) = data_dir();
        write_file(&root, "a.txt", "alpha");

        let store = open_store(&root);
        assert!(store.index_path().is_file());
        assert_eq!(
            std::fs::read_to_string(store.index_path()).expect("read index"),
            "a.jpg\talpha"
        );
    }

    #[test]
    fn open_keeps_existing_index() {
        let (_temp, root) = data_dir();
        write_file(&root, "label.txt", "a.jpg\tindexed");
        write_file(&root, "a.txt", "sidecar");

        let store = open_store(&root);
        assert_eq!(store.get_label("a.jpg").expect("get label").label, "indexed");
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_temp, root) = data_dir();
        write_image(&root, "photo1.jpg");
        let store = open_store(&root);

        let stored = store
            .set_label("photo1.jpg", "  xin chào  ")
            .expect("set label");
        assert_eq!(stored.name, "photo1.jpg");
        assert_eq!(stored.label, "  xin chào  ");

        let fetched = store.get_label("photo1.jpg").expect("get label");
        assert_eq!(fetched, stored);
        // The sidecar holds the raw, untrimmed text.
        assert_eq!(
            std::fs::read_to_string(root.join("photo1.txt")).expect("read sidecar"),
            "  xin chào  "
        );
    }

    #[test]
    fn set_label_upserts_and_keeps_index_sorted() {
        let (_temp, root) = data_dir();
        for name in ["b.png", "a.jpg", "c.bmp"] {
            write_image(&root, name);
        }
        let store = open_store(&root);

        store.set_label("c.bmp", "three").expect("set c");
        store.set_label("a.jpg", "one").expect("set a");
        store.set_label("b.png", "two").expect("set b");
        store.set_label("a.jpg", "uno").expect("overwrite a");

        assert_eq!(
            std::fs::read_to_string(store.index_path()).expect("read index"),
            "a.jpg\tuno\nb.png\ttwo\nc.bmp\tthree"
        );
    }

    #[test]
    fn set_label_for_missing_image_has_no_side_effects() {
        let (_temp, root) = data_dir();
        write_file(&root, "label.txt", "other.jpg\tx");
        let store = open_store(&root);

        assert!(matches!(
            store.set_label("ghost.jpg", "boo"),
            Err(CoreError::ImageNotFound(_))
        ));
        assert!(!root.join("ghost.txt").exists());
        assert_eq!(
            std::fs::read_to_string(store.index_path()).expect("read index"),
            "other.jpg\tx"
        );
    }

    #[test]
    fn set_label_validates_name_extension_and_text() {
        let (_temp, root) = data_dir();
        write_image(&root, "photo.jpg");
        write_file(&root, "notes.gif", "");
        let store = open_store(&root);

        assert!(matches!(
            store.set_label("../photo.jpg", "x"),
            Err(CoreError::InvalidPath(_))
        ));
        assert!(matches!(
            store.set_label("notes.gif", "x"),
            Err(CoreError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            store.set_label("photo.jpg", "two\nlines"),
            Err(CoreError::InvalidLabel(_))
        ));
        assert!(!root.join("photo.txt").exists());
    }

    #[test]
    fn set_label_rejects_names_that_would_break_index_lines() {
        let (_temp, root) = data_dir();
        write_image(&root, "real.jpg");
        write_image(&root, "x\nreal.jpg");
        write_image(&root, "a\tb.jpg");
        let store = open_store(&root);
        store.set_label("real.jpg", "genuine").expect("set real label");

        for raw in ["x\nreal.jpg", "a\tb.jpg"] {
            assert!(
                matches!(store.set_label(raw, "INJECTED"), Err(CoreError::InvalidPath(_))),
                "{raw:?} must be rejected"
            );
        }
        assert!(!root.join("x\nreal.txt").exists());
        assert_eq!(
            std::fs::read_to_string(store.index_path()).expect("read index"),
            "real.jpg\tgenuine"
        );
    }

    #[test]
    fn uppercase_extension_survives_refresh() {
        let (_temp, root) = data_dir();
        write_image(&root, "scan.PNG");
        let store = open_store(&root);

        store.set_label("scan.PNG", "chữ in hoa").expect("set label");
        store.refresh().expect("refresh");

        let entry = store.get_label("scan.PNG").expect("label survives refresh");
        assert_eq!(entry.label, "chữ in hoa");
        assert!(store.get_label("scan.jpg").is_err());
    }

    #[test]
    fn set_label_refuses_to_overwrite_index() {
        let (_temp, root) = data_dir();
        write_image(&root, "Label.png");
        let store = open_store(&root);

        assert!(matches!(
            store.set_label("Label.png", "clobber"),
            Err(CoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn get_label_sanitizes_and_reports_missing() {
        let (_temp, root) = data_dir();
        write_file(&root, "label.txt", "a.jpg\talpha");
        let store = open_store(&root);

        let entry = store.get_label("nested/a.jpg").expect("basename lookup");
        assert_eq!(entry.name, "a.jpg");
        assert_eq!(entry.label, "alpha");
        assert!(matches!(
            store.get_label("b.jpg"),
            Err(CoreError::LabelNotFound(_))
        ));
        assert!(matches!(
            store.get_label(".."),
            Err(CoreError::LabelNotFound(_))
        ));
    }

    #[test]
    fn snapshot_rebuilds_index_deleted_after_open() {
        let (_temp, root) = data_dir();
        write_file(&root, "a.txt", "alpha");
        let store = open_store(&root);

        std::fs::remove_file(store.index_path()).expect("delete index");
        write_file(&root, "b.txt", "beta");

        let labels = store.snapshot().expect("snapshot");
        assert_eq!(labels.len(), 2);
        assert!(store.index_path().is_file());
    }

    #[test]
    fn refresh_replaces_stale_index() {
        let (_temp, root) = data_dir();
        write_file(&root, "label.txt", "stale.jpg\told");
        write_file(&root, "fresh.txt", "  new  ");
        let store = open_store(&root);
        assert!(store.get_label("fresh.jpg").is_err());

        store.refresh().expect("refresh");

        let labels = store.snapshot().expect("snapshot");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels["fresh.jpg"], "new");
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let (_temp, root) = data_dir();
        let names: Vec<String> = (0..16).map(|i| format!("img{i:02}.jpg")).collect();
        for name in &names {
            write_image(&root, name);
        }
        let store = open_store(&root);

        std::thread::scope(|scope| {
            for name in &names {
                let store = &store;
                scope.spawn(move || {
                    store
                        .set_label(name, &format!("label for {name}"))
                        .expect("concurrent set label");
                });
            }
        });

        let labels = store.snapshot().expect("snapshot");
        assert_eq!(labels.len(), names.len());
        for name in &names {
            assert_eq!(labels[name], format!("label for {name}"));
        }
    }
}
