//! BrowserEvent: everything the list core tells the view layer.

use media_proto::protocol::{ListKind, MediaItem};

use crate::notice::Notice;

/// Events flow one way: from the classifier and coordinator up to the view.
/// The view never feeds them back in.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    // ── Selection ────────────────────────────────────────────────────────────
    /// Short press: play the item.
    Select(MediaItem),
    /// Long press: show the item's detail/actions view.
    SelectAndHold(MediaItem),

    // ── Refresh lifecycle ────────────────────────────────────────────────────
    RefreshStarted(ListKind),
    RefreshEnded(ListKind),

    // ── View directives ──────────────────────────────────────────────────────
    Notice(Notice),
    DetailHidden,
    ScrollToTop,
}
