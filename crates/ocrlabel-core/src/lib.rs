pub mod error;
pub mod labels;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::CoreError;
pub use labels::{LabelEntry, LabelPage, LabelQuery, LabelStore, StoreConfig};
