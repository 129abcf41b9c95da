//! Filtering and pagination over a snapshot of the label index.

use super::types::{LabelEntry, LabelMap, LabelPage, LabelQuery};

/// Filter `labels` and cut out one page. Entries are visited in ordinal
/// name order. `only_unlabeled` keeps entries whose label trims to empty;
/// `search` (trimmed, case-insensitive) must be a substring of the name
/// or the label. Pages past the end are empty rather than an error.
pub fn query(labels: &LabelMap, query: &LabelQuery) -> LabelPage {
    let needle = query.search.trim().to_lowercase();

    let matching: Vec<(&String, &String)> = labels
        .iter()
        .filter(|(_, label)| !query.only_unlabeled || label.trim().is_empty())
        .filter(|(name, label)| {
            needle.is_empty()
                || name.to_lowercase().contains(&needle)
                || label.to_lowercase().contains(&needle)
        })
        .collect();

    let page_index = usize::try_from(query.page.saturating_sub(1).max(0)).unwrap_or(usize::MAX);
    let offset = page_index.saturating_mul(query.size);

    LabelPage {
        total: matching.len(),
        items: matching
            .into_iter()
            .skip(offset)
            .take(query.size)
            .map(|(name, label)| LabelEntry {
                name: name.clone(),
                label: label.clone(),
            })
            .collect(),
    }
}
