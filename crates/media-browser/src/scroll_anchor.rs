//! ScrollAnchor: remember a container's offset across a content swap and put
//! it back afterwards.
//!
//! Content nested inside the container may still be laying itself out when
//! the first apply lands, so every successful apply asks for one more attempt
//! after a short delay. Only that follow-up forgets the saved offset.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// Delay before the follow-up apply.
pub const RETRY_DELAY: Duration = Duration::from_millis(50);

/// A scrollable container as the anchor sees it.
pub trait ScrollTarget {
    fn scroll_offset(&self) -> f64;

    fn set_scroll_offset(&mut self, offset: f64);

    /// False while the container or its content is still mounting/updating.
    fn is_settled(&self) -> bool {
        true
    }
}

/// Returned by [`ScrollAnchor::apply`] when a follow-up apply is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReapply {
    due: Instant,
}

impl PendingReapply {
    pub fn due(&self) -> Instant {
        self.due
    }
}

#[derive(Debug, Clone)]
pub struct ScrollAnchor {
    saved_offset: f64,
    retry_delay: Duration,
}

impl Default for ScrollAnchor {
    fn default() -> Self {
        Self::new(RETRY_DELAY)
    }
}

impl ScrollAnchor {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            saved_offset: 0.0,
            retry_delay,
        }
    }

    pub fn saved_offset(&self) -> f64 {
        self.saved_offset
    }

    pub fn save<T: ScrollTarget + ?Sized>(&mut self, target: &T) {
        self.saved_offset = target.scroll_offset();
        debug!("scroll anchor saved at {}", self.saved_offset);
    }

    /// Forget the saved offset without applying it.
    pub fn reset(&mut self) {
        self.saved_offset = 0.0;
    }

    /// Restore the saved offset. Zero means nothing to restore; an unsettled
    /// target is left alone and the offset kept for a later call.
    pub fn apply<T: ScrollTarget + ?Sized>(&mut self, target: &mut T) -> Option<PendingReapply> {
        if !self.set_offset(target) {
            return None;
        }
        Some(PendingReapply {
            due: Instant::now() + self.retry_delay,
        })
    }

    /// The follow-up for an earlier [`apply`](Self::apply): apply once more,
    /// then forget the offset.
    pub fn reapply<T: ScrollTarget + ?Sized>(&mut self, _pending: PendingReapply, target: &mut T) {
        self.set_offset(target);
        self.saved_offset = 0.0;
    }

    fn set_offset<T: ScrollTarget + ?Sized>(&self, target: &mut T) -> bool {
        if self.saved_offset == 0.0 || !target.is_settled() {
            return false;
        }
        target.set_scroll_offset(self.saved_offset);
        true
    }
}
