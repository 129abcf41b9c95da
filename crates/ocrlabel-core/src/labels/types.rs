//! Label entries, listing query/page types and store configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{de, Deserialize, Deserializer, Serialize};

pub const DEFAULT_LABEL_FILE: &str = "label.txt";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Image name → label text. `BTreeMap` keeps keys in ordinal byte order,
/// which is the order both the on-disk index and listings use.
pub type LabelMap = BTreeMap<String, String>;

// ==============================================================================
// Entries and Listing
// ==============================================================================

/// One image and its label. An empty (or whitespace-only) label means
/// the image has not been labeled yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    pub name: String,
    pub label: String,
}

/// Filter and pagination parameters for listing labels.
///
/// `page` is 1-based; zero or negative pages behave like page 1.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LabelQuery {
    pub page: i64,
    pub size: usize,
    #[serde(deserialize_with = "deserialize_flag")]
    pub only_unlabeled: bool,
    pub search: String,
}

impl Default for LabelQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            only_unlabeled: false,
            search: String::new(),
        }
    }
}

/// Accept JSON booleans as well as the usual query-string spellings
/// (`1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`, `t`/`f`, `y`/`n`),
/// case-insensitively.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl de::Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean flag such as true, false, 1, 0, yes, no, on or off")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(value), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
                "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// One page of listing results. `total` counts every entry that passed
/// the filters, not just the ones on this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelPage {
    pub total: usize,
    pub items: Vec<LabelEntry>,
}

// ==============================================================================
// Configuration
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding images, sidecars and the aggregate index.
    pub data_dir: PathBuf,
    /// Basename of the aggregate index file inside `data_dir`.
    pub label_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            label_file: DEFAULT_LABEL_FILE.to_string(),
        }
    }
}
