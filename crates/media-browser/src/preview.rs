//! PreviewRegistry: per editing session, which list kinds have been populated
//! and which have already announced their preview truncation.
//!
//! One registry is created per editing session and handed to every
//! coordinator, so repeated mounts of the same list kind share it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use media_proto::protocol::ListKind;

#[derive(Debug, Default)]
struct Marks {
    loaded: HashSet<ListKind>,
    truncated: HashSet<ListKind>,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    marks: Arc<Mutex<Marks>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `kind` was populated with items in preview mode.
    pub fn mark_loaded(&self, kind: ListKind) {
        if let Ok(mut marks) = self.marks.lock() {
            marks.loaded.insert(kind);
        }
    }

    pub fn is_loaded(&self, kind: ListKind) -> bool {
        self.marks
            .lock()
            .map(|marks| marks.loaded.contains(&kind))
            .unwrap_or(false)
    }

    /// Record that `kind` was cut down to the preview cap. Returns true the
    /// first time in the session.
    pub fn mark_truncated(&self, kind: ListKind) -> bool {
        match self.marks.lock() {
            Ok(mut marks) => marks.truncated.insert(kind),
            Err(_) => false,
        }
    }

    /// Forget both marks for `kind`.
    pub fn clear(&self, kind: ListKind) {
        if let Ok(mut marks) = self.marks.lock() {
            marks.loaded.remove(&kind);
            marks.truncated.remove(&kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_is_announced_once_per_kind() {
        let registry = PreviewRegistry::new();
        assert!(registry.mark_truncated(ListKind::Devices));
        assert!(!registry.mark_truncated(ListKind::Devices));
        assert!(registry.mark_truncated(ListKind::TrackFavorites));
    }

    #[test]
    fn test_loaded_does_not_imply_truncated() {
        let registry = PreviewRegistry::new();
        registry.mark_loaded(ListKind::Devices);
        assert!(registry.is_loaded(ListKind::Devices));
        assert!(registry.mark_truncated(ListKind::Devices));
    }

    #[test]
    fn test_clones_share_state() {
        let registry = PreviewRegistry::new();
        let other = registry.clone();
        registry.mark_loaded(ListKind::ShowFavorites);
        registry.mark_truncated(ListKind::ShowFavorites);
        assert!(other.is_loaded(ListKind::ShowFavorites));
        other.clear(ListKind::ShowFavorites);
        assert!(!registry.is_loaded(ListKind::ShowFavorites));
        assert!(registry.mark_truncated(ListKind::ShowFavorites));
    }
}
