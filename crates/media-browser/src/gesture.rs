//! Select vs. select-and-hold disambiguation for one list item.
//!
//! # States
//! ```text
//!  Unset                       no press, or the press already resolved
//!  Pressed { started_at, .. }  waiting for release (or the touch hold timer)
//! ```
//!
//! Pointer input resolves only on release: shorter than `hold` is a Select,
//! anything else a SelectAndHold.
//!
//! Touch input also arms a one-shot hold timer (`touch_timer`, a little longer
//! than `hold` to leave room for the scroll check). Both the timer and
//! touch-end compare the nearest scrollable ancestor's offset against the one
//! captured at touch-start; a difference means the finger was scrolling and
//! nothing is emitted, with the press left untouched. The offset is only sampled at those instants, so a
//! scroll that returns to its origin in between still counts as a hold.
//!
//! Timers are never cancelled. A timer that fires after its press resolved, or
//! after a newer press began, finds no live press behind its ticket and does
//! nothing.

use std::time::Duration;

use ratatui::crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tokio::time::Instant;
use tracing::debug;

use media_proto::config::BrowserConfig;

/// Press duration at which a release becomes a SelectAndHold.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(1000);

/// Delay before an unreleased touch resolves as a SelectAndHold.
pub const TOUCH_HOLD_TIMER: Duration = Duration::from_millis(1100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Select,
    SelectAndHold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureThresholds {
    pub hold: Duration,
    pub touch_timer: Duration,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            hold: HOLD_THRESHOLD,
            touch_timer: TOUCH_HOLD_TIMER,
        }
    }
}

impl From<&BrowserConfig> for GestureThresholds {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            hold: Duration::from_millis(config.pointer_hold_ms),
            touch_timer: Duration::from_millis(config.touch_hold_ms),
        }
    }
}

/// A node in the view tree. Scroll containers report their offset.
pub trait ViewNode {
    fn parent(&self) -> Option<&Self>;

    /// Vertical offset when this node scrolls, `None` otherwise.
    fn scroll_offset(&self) -> Option<f64>;
}

/// Offset of the nearest scrollable node, starting at `node` itself.
/// The press target is usually a row inside the container, not the container.
pub fn enclosing_scroll_offset<N: ViewNode + ?Sized>(node: &N) -> f64 {
    let mut current = Some(node);
    while let Some(n) = current {
        if let Some(offset) = n.scroll_offset() {
            return offset;
        }
        current = n.parent();
    }
    0.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    Pointer,
    Touch { origin_offset: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    started_at: Instant,
    input: Input,
}

/// Handed out at touch-start; redeem it with [`GestureClassifier::hold_elapsed`]
/// once [`HoldTicket::fire_at`] has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTicket {
    generation: u64,
    fire_at: Instant,
}

impl HoldTicket {
    pub fn fire_at(&self) -> Instant {
        self.fire_at
    }
}

/// Per-item press state machine.
#[derive(Debug, Default)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
    /// `None` is the resolved/unset sentinel.
    press: Option<Press>,
    /// Bumped on every press so tickets from older presses go stale.
    generation: u64,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            press: None,
            generation: 0,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    // ── Pointer ──────────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, now: Instant) {
        self.begin(now, Input::Pointer);
    }

    pub fn pointer_up(&mut self, now: Instant) -> Option<Gesture> {
        let press = self.live_press(self.generation)?;
        if press.input != Input::Pointer {
            return None;
        }
        self.press = None;
        Some(self.classify(now, press.started_at))
    }

    /// Feed a terminal mouse event through the pointer path.
    /// Only left-button down/up participate.
    pub fn handle_mouse(&mut self, event: &MouseEvent, now: Instant) -> Option<Gesture> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_down(now);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer_up(now),
            _ => None,
        }
    }

    // ── Touch ────────────────────────────────────────────────────────────────

    pub fn touch_start<N: ViewNode + ?Sized>(&mut self, now: Instant, target: &N) -> HoldTicket {
        let origin_offset = enclosing_scroll_offset(target);
        self.begin(now, Input::Touch { origin_offset });
        HoldTicket {
            generation: self.generation,
            fire_at: now + self.thresholds.touch_timer,
        }
    }

    /// The hold timer for `ticket` fired.
    pub fn hold_elapsed<N: ViewNode + ?Sized>(
        &mut self,
        ticket: HoldTicket,
        target: &N,
    ) -> Option<Gesture> {
        let press = self.live_press(ticket.generation)?;
        let Input::Touch { origin_offset } = press.input else {
            return None;
        };
        if enclosing_scroll_offset(target) != origin_offset {
            // Scrolling pre-empts the hold but does not resolve the press.
            debug!("touch hold ignored: container scrolled");
            return None;
        }
        self.press = None;
        debug!("touch hold resolved by timer");
        Some(Gesture::SelectAndHold)
    }

    pub fn touch_end<N: ViewNode + ?Sized>(&mut self, now: Instant, target: &N) -> Option<Gesture> {
        let press = self.live_press(self.generation)?;
        let Input::Touch { origin_offset } = press.input else {
            return None;
        };
        if enclosing_scroll_offset(target) != origin_offset {
            debug!("touch end ignored: container scrolled");
            return None;
        }
        self.press = None;
        Some(self.classify(now, press.started_at))
    }

    /// Touch cancelled by the host, or escape pressed: resolve with no outcome.
    pub fn cancel(&mut self) {
        self.press = None;
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn begin(&mut self, now: Instant, input: Input) {
        self.generation = self.generation.wrapping_add(1);
        self.press = Some(Press {
            started_at: now,
            input,
        });
    }

    /// Shared staleness guard for the timer and both release paths: the press
    /// belonging to `generation`, if it has not resolved yet.
    fn live_press(&self, generation: u64) -> Option<Press> {
        if generation != self.generation {
            return None;
        }
        self.press
    }

    fn classify(&self, now: Instant, started_at: Instant) -> Gesture {
        let held = now.saturating_duration_since(started_at);
        let gesture = if held < self.thresholds.hold {
            Gesture::Select
        } else {
            Gesture::SelectAndHold
        };
        debug!("press resolved after {}ms: {:?}", held.as_millis(), gesture);
        gesture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use std::cell::Cell;

    /// Row inside a scroll container.
    struct Node<'a> {
        parent: Option<&'a Node<'a>>,
        offset: Option<Cell<f64>>,
    }

    impl<'a> ViewNode for Node<'a> {
        fn parent(&self) -> Option<&Self> {
            self.parent
        }

        fn scroll_offset(&self) -> Option<f64> {
            self.offset.as_ref().map(Cell::get)
        }
    }

    fn container(offset: f64) -> Node<'static> {
        Node {
            parent: None,
            offset: Some(Cell::new(offset)),
        }
    }

    fn row<'a>(parent: &'a Node<'a>) -> Node<'a> {
        Node {
            parent: Some(parent),
            offset: None,
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pointer_threshold_boundary() {
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        c.pointer_down(t0);
        assert_eq!(c.pointer_up(t0 + ms(999)), Some(Gesture::Select));

        c.pointer_down(t0);
        assert_eq!(c.pointer_up(t0 + ms(1000)), Some(Gesture::SelectAndHold));
    }

    #[test]
    fn test_duplicate_pointer_release_ignored() {
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        c.pointer_down(t0);
        assert_eq!(c.pointer_up(t0 + ms(10)), Some(Gesture::Select));
        assert_eq!(c.pointer_up(t0 + ms(20)), None);
        assert!(!c.is_pressed());
    }

    #[test]
    fn test_release_without_press_ignored() {
        let mut c = GestureClassifier::default();
        assert_eq!(c.pointer_up(Instant::now()), None);
    }

    #[test]
    fn test_mouse_events_drive_pointer_path() {
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let mouse = |kind| MouseEvent {
            kind,
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            c.handle_mouse(&mouse(MouseEventKind::Down(MouseButton::Left)), t0),
            None
        );
        assert_eq!(
            c.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Right)), t0 + ms(50)),
            None
        );
        assert_eq!(
            c.handle_mouse(&mouse(MouseEventKind::Up(MouseButton::Left)), t0 + ms(1500)),
            Some(Gesture::SelectAndHold)
        );
    }

    #[test]
    fn test_touch_tap_selects() {
        let list = container(120.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        assert_eq!(ticket.fire_at(), t0 + TOUCH_HOLD_TIMER);
        assert_eq!(c.touch_end(t0 + ms(200), &item), Some(Gesture::Select));
        // timer fires later against a resolved press
        assert_eq!(c.hold_elapsed(ticket, &item), None);
    }

    #[test]
    fn test_touch_hold_fires_once() {
        let list = container(0.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        assert_eq!(c.hold_elapsed(ticket, &item), Some(Gesture::SelectAndHold));
        assert_eq!(c.touch_end(t0 + ms(1300), &item), None);
    }

    #[test]
    fn test_touch_scroll_emits_nothing() {
        let list = container(40.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        list.offset.as_ref().unwrap().set(41.5);
        assert_eq!(c.touch_end(t0 + ms(300), &item), None);
        // the press stays as it was
        assert!(c.is_pressed());
        assert_eq!(c.hold_elapsed(ticket, &item), None);
    }

    #[test]
    fn test_timer_after_scrolled_touch_end_can_still_hold() {
        let list = container(0.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        list.offset.as_ref().unwrap().set(30.0);
        assert_eq!(c.touch_end(t0 + ms(200), &item), None);
        list.offset.as_ref().unwrap().set(0.0);
        assert_eq!(c.hold_elapsed(ticket, &item), Some(Gesture::SelectAndHold));
        assert!(!c.is_pressed());
    }

    #[test]
    fn test_scroll_before_timer_leaves_press_unresolved() {
        let list = container(0.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        list.offset.as_ref().unwrap().set(200.0);
        assert_eq!(c.hold_elapsed(ticket, &item), None);
        assert!(c.is_pressed());
        // still scrolled at touch-end: nothing
        assert_eq!(c.touch_end(t0 + ms(1500), &item), None);
    }

    #[test]
    fn test_offset_sampled_only_at_start_and_end() {
        let list = container(10.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        c.touch_start(t0, &item);
        list.offset.as_ref().unwrap().set(80.0);
        list.offset.as_ref().unwrap().set(10.0);
        assert_eq!(c.touch_end(t0 + ms(100), &item), Some(Gesture::Select));
    }

    #[test]
    fn test_stale_ticket_cannot_resolve_newer_press() {
        let list = container(0.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let old = c.touch_start(t0, &item);
        c.touch_end(t0 + ms(100), &item);
        let _new = c.touch_start(t0 + ms(500), &item);
        assert_eq!(c.hold_elapsed(old, &item), None);
        assert!(c.is_pressed());
    }

    #[test]
    fn test_cancel_resolves_without_outcome() {
        let list = container(0.0);
        let item = row(&list);
        let t0 = Instant::now();
        let mut c = GestureClassifier::default();
        let ticket = c.touch_start(t0, &item);
        c.cancel();
        assert_eq!(c.hold_elapsed(ticket, &item), None);
        assert_eq!(c.touch_end(t0 + ms(50), &item), None);
    }

    #[test]
    fn test_enclosing_offset_walks_ancestors() {
        let outer = container(7.0);
        let middle = row(&outer);
        let leaf = row(&middle);
        assert_eq!(enclosing_scroll_offset(&leaf), 7.0);
        let orphan = Node {
            parent: None,
            offset: None,
        };
        assert_eq!(enclosing_scroll_offset(&orphan), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_ticket_waits_for_timer() {
        let list = container(0.0);
        let item = row(&list);
        let mut c = GestureClassifier::default();
        let start = Instant::now();
        let ticket = c.touch_start(start, &item);
        tokio::time::sleep_until(ticket.fire_at()).await;
        assert!(Instant::now() >= start + TOUCH_HOLD_TIMER);
        assert_eq!(c.hold_elapsed(ticket, &item), Some(Gesture::SelectAndHold));
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = BrowserConfig {
            pointer_hold_ms: 500,
            touch_hold_ms: 650,
            ..BrowserConfig::default()
        };
        let t = GestureThresholds::from(&config);
        assert_eq!(t.hold, ms(500));
        assert_eq!(t.touch_timer, ms(650));
    }
}
