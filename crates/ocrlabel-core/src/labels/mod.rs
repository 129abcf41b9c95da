//! Image label management for ocrlabel.
//!
//! Labels live in two persisted forms inside a flat data directory:
//! one sidecar `<stem>.txt` per image (the source of truth) and a single
//! tab-separated aggregate index (a rebuildable projection of the
//! sidecars). This module keeps the two in agreement and exposes safe
//! lookup, mutation and paginated listing over them.

mod index;
mod query;
mod reconcile;
mod sanitize;
mod store;
mod types;

pub use index::{parse_index, serialize_index};
pub use query::query;
pub use reconcile::collect_sidecars;
pub use sanitize::{
    has_allowed_image_extension, resolve_image_path, safe_basename, ResolvedImage,
    ALLOWED_IMAGE_EXTENSIONS, SIDECAR_EXTENSION,
};
pub use store::LabelStore;
pub use types::{
    LabelEntry, LabelMap, LabelPage, LabelQuery, StoreConfig, DEFAULT_DATA_DIR,
    DEFAULT_LABEL_FILE, DEFAULT_PAGE_SIZE,
};
