//! Filter projection over a list snapshot. Pure and synchronous: filtering
//! never touches the cache or triggers a refresh.

use std::sync::Arc;

use media_proto::protocol::MediaItem;

/// Case-insensitive substring match against any displayed field.
pub fn item_matches(item: &MediaItem, query: &str) -> bool {
    let q = query.trim();
    if q.is_empty() {
        return true;
    }
    let q = q.to_lowercase();
    item.display_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
}

/// A snapshot plus the indices that survive the current filter.
#[derive(Debug, Clone)]
pub struct FilteredSlice {
    items: Arc<[MediaItem]>,
    filtered_indices: Vec<usize>,
}

impl FilteredSlice {
    pub fn new(items: Arc<[MediaItem]>, query: &str) -> Self {
        let filtered_indices = if query.trim().is_empty() {
            (0..items.len()).collect()
        } else {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| item_matches(item, query))
                .map(|(i, _)| i)
                .collect()
        };
        Self {
            items,
            filtered_indices,
        }
    }

    pub fn get(&self, idx: usize) -> Option<&MediaItem> {
        let orig = self.filtered_indices.get(idx)?;
        self.items.get(*orig)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> + '_ {
        self.filtered_indices.iter().map(|&i| &self.items[i])
    }

    /// Index into the unfiltered snapshot of the `idx`th visible item.
    pub fn original_index(&self, idx: usize) -> Option<usize> {
        self.filtered_indices.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.filtered_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_indices.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}
