//! ListRefreshCoordinator: owns one list's cached slices, the in-flight
//! guard and the editor preview policy.
//!
//! # States
//! ```text
//!  Idle ──refresh()──▶ Refreshing ──all slices settled──▶ Idle
//!   ▲                      │
//!   └── refresh() while Refreshing is rejected (RefreshInProgress)
//! ```
//!
//! A list is made of one or more slices, each fetched independently. Every
//! slice fetch of a refresh is started at once and the refresh ends when all
//! of them have settled; a failing slice never holds up or cancels the others.
//!
//! While the host dashboard is being edited (preview mode) a list that already
//! has a cached snapshot is served from the cache without touching the
//! network, and every slice is capped at `preview_cap` items.
//!
//! Everything runs on one thread. State lives in `Cell`/`RefCell` and no
//! borrow is held across an await point.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use media_proto::cache::{CacheKey, ListCacheEntry, ListCacheStore};
use media_proto::config::BrowserConfig;
use media_proto::protocol::{AccountId, ListKind, MediaItem};

use crate::action::BrowserEvent;
use crate::error::BrowserError;
use crate::fetch::{FetchRequest, ListFetcher, Paging};
use crate::filter::FilteredSlice;
use crate::gesture::Gesture;
use crate::notice::{Notice, NoticeBoard};
use crate::preview::PreviewRegistry;
use crate::scroll_anchor::{PendingReapply, ScrollAnchor, ScrollTarget};

/// Items kept per slice while the dashboard is being edited.
pub const PREVIEW_ITEM_CAP: usize = 25;

const NO_ITEMS_FOUND: &str = "No items found";
const REFRESH_IN_PROGRESS: &str = "Previous refresh is still in progress, please wait";

/// One independently fetched part of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSpec {
    /// What the slice holds; used in notices.
    pub name: String,
    pub request: FetchRequest,
}

impl SliceSpec {
    pub fn new(name: impl Into<String>, request: FetchRequest) -> Self {
        Self {
            name: name.into(),
            request,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSpec {
    pub kind: ListKind,
    pub slices: Vec<SliceSpec>,
}

impl ListSpec {
    pub fn single(kind: ListKind, paging: Paging) -> Self {
        Self {
            kind,
            slices: vec![SliceSpec::new(kind.label(), FetchRequest::new(kind, paging))],
        }
    }

    /// Category browsing: the category list plus the playlists of one category.
    pub fn category(category_id: &str, paging: Paging) -> Self {
        Self {
            kind: ListKind::CategoryPlaylists,
            slices: vec![
                SliceSpec::new(
                    ListKind::Categories.label(),
                    FetchRequest::new(ListKind::Categories, paging),
                ),
                SliceSpec::new(
                    ListKind::CategoryPlaylists.label(),
                    FetchRequest::scoped(ListKind::CategoryPlaylists, category_id, paging),
                ),
            ],
        }
    }
}

/// An in-memory slice. Replaced whole, never edited in place, so readers
/// always see a complete snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSnapshot {
    pub items: Arc<[MediaItem]>,
    /// Epoch seconds; 0 when the slice has never loaded.
    pub last_updated_at: i64,
}

impl SliceSnapshot {
    fn new(items: Vec<MediaItem>, last_updated_at: i64) -> Self {
        Self {
            items: items.into(),
            last_updated_at,
        }
    }
}

impl Default for SliceSnapshot {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    /// One `FetchFailed` per slice that did not load.
    pub failures: Vec<BrowserError>,
    /// Items across all slices that loaded, before any preview cap.
    pub item_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Preview mode with a cached snapshot: nothing was fetched.
    PreviewCached,
    Fetched(RefreshReport),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MountOutcome {
    /// Preview mode and this list was already populated this session.
    AlreadyLoaded,
    /// Every slice came from the cache.
    Cached,
    Refreshed(RefreshOutcome),
}

/// Holds the in-progress flag for the duration of a refresh and clears it on
/// drop, whatever way the refresh ends.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct ListRefreshCoordinator {
    spec: ListSpec,
    account: AccountId,
    fetcher: Arc<dyn ListFetcher>,
    store: Arc<dyn ListCacheStore>,
    preview: watch::Receiver<bool>,
    registry: PreviewRegistry,
    events: mpsc::UnboundedSender<BrowserEvent>,
    preview_cap: usize,

    in_progress: Cell<bool>,
    slices: RefCell<Vec<SliceSnapshot>>,
    filter_text: RefCell<String>,
    notices: RefCell<NoticeBoard>,
    detail: RefCell<Option<MediaItem>>,
    anchor: RefCell<ScrollAnchor>,
}

impl ListRefreshCoordinator {
    pub fn new(
        spec: ListSpec,
        account: AccountId,
        fetcher: Arc<dyn ListFetcher>,
        store: Arc<dyn ListCacheStore>,
        preview: watch::Receiver<bool>,
        registry: PreviewRegistry,
        events: mpsc::UnboundedSender<BrowserEvent>,
    ) -> Self {
        let slices = vec![SliceSnapshot::default(); spec.slices.len()];
        Self {
            spec,
            account,
            fetcher,
            store,
            preview,
            registry,
            events,
            preview_cap: PREVIEW_ITEM_CAP,
            in_progress: Cell::new(false),
            slices: RefCell::new(slices),
            filter_text: RefCell::new(String::new()),
            notices: RefCell::new(NoticeBoard::new()),
            detail: RefCell::new(None),
            anchor: RefCell::new(ScrollAnchor::default()),
        }
    }

    /// Apply the preview cap and scroll retry delay from config.
    pub fn configured(mut self, config: &BrowserConfig) -> Self {
        self.preview_cap = config.preview_item_cap;
        self.anchor = RefCell::new(ScrollAnchor::new(std::time::Duration::from_millis(
            config.scroll_retry_ms,
        )));
        self
    }

    pub fn kind(&self) -> ListKind {
        self.spec.kind
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_progress.get()
    }

    pub fn is_preview(&self) -> bool {
        *self.preview.borrow()
    }

    pub fn snapshot(&self, slice: usize) -> Option<SliceSnapshot> {
        self.slices.borrow().get(slice).cloned()
    }

    /// The slice as currently filtered.
    pub fn filtered(&self, slice: usize) -> Option<FilteredSlice> {
        let snapshot = self.snapshot(slice)?;
        Some(FilteredSlice::new(snapshot.items, &self.filter_text.borrow()))
    }

    pub fn filter_text(&self) -> String {
        self.filter_text.borrow().clone()
    }

    /// Change the filter. Only the projection changes; nothing is fetched or
    /// written.
    pub fn set_filter(&self, text: &str) {
        *self.filter_text.borrow_mut() = text.to_string();
    }

    /// Enter pressed in the filter field.
    pub async fn submit_filter(&self) -> Result<RefreshOutcome, BrowserError> {
        self.refresh().await
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.borrow().current()
    }

    pub fn detail(&self) -> Option<MediaItem> {
        self.detail.borrow().clone()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Called whenever the host (re)mounts the list.
    pub async fn mount(&self) -> Result<MountOutcome, BrowserError> {
        let kind = self.spec.kind;
        if self.is_preview() && self.registry.is_loaded(kind) && self.has_items() {
            debug!("{}: already loaded for this editing session", kind);
            return Ok(MountOutcome::AlreadyLoaded);
        }

        match self.cached_entries() {
            Some(entries) => {
                if let Some(text) = entries.iter().find_map(ListCacheEntry::filter_text) {
                    *self.filter_text.borrow_mut() = text.to_string();
                }
                self.load_entries(entries);
                if self.is_preview() {
                    self.apply_preview_cap();
                }
                debug!("{}: mounted from cache", kind);
                Ok(MountOutcome::Cached)
            }
            None => self.refresh().await.map(MountOutcome::Refreshed),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, BrowserError> {
        let kind = self.spec.kind;
        let Some(guard) = InFlight::acquire(&self.in_progress) else {
            return Err(self.reject_busy());
        };

        info!("{}: refresh started", kind);
        self.notices.borrow_mut().clear();
        self.emit(BrowserEvent::RefreshStarted(kind));
        self.hide_detail();
        self.scroll_to_top();

        let outcome = match self.preview_snapshot() {
            Some(entries) => {
                debug!("{}: preview mode, serving cached snapshot", kind);
                self.load_entries(entries);
                RefreshOutcome::PreviewCached
            }
            None => RefreshOutcome::Fetched(self.fetch_all().await),
        };

        drop(guard);

        if self.is_preview() {
            self.apply_preview_cap();
        }
        if let RefreshOutcome::Fetched(report) = &outcome {
            if report.failures.is_empty() && report.item_count == 0 {
                self.show_info(NO_ITEMS_FOUND);
            }
        }

        self.emit(BrowserEvent::RefreshEnded(kind));
        info!("{}: refresh finished ({:?})", kind, outcome);
        Ok(outcome)
    }

    /// User-initiated refresh: forget the persisted items and timestamps and
    /// the preview marks before refreshing. A stored filter survives.
    pub async fn hard_refresh(&self) -> Result<RefreshOutcome, BrowserError> {
        if self.in_progress.get() {
            return Err(self.reject_busy());
        }
        for slice in &self.spec.slices {
            let key = self.cache_key(slice);
            let filter_text = self
                .store
                .get(&key)
                .and_then(|entry| entry.filter_text().map(str::to_string));
            let result = match filter_text {
                Some(text) => self
                    .store
                    .set(&key, ListCacheEntry::populated(Vec::new(), 0, Some(text))),
                None => self.store.clear(&key),
            };
            if let Err(e) = result {
                warn!("failed to clear cache slot {}: {}", key, e);
            }
        }
        self.registry.clear(self.spec.kind);
        self.refresh().await
    }

    // ── Gestures ─────────────────────────────────────────────────────────────

    /// Route a classified gesture on `item`. A hold remembers where the list
    /// was scrolled before the detail view replaces it.
    pub fn handle_gesture<T: ScrollTarget + ?Sized>(
        &self,
        gesture: Gesture,
        item: MediaItem,
        container: &T,
    ) {
        match gesture {
            Gesture::Select => self.emit(BrowserEvent::Select(item)),
            Gesture::SelectAndHold => {
                self.anchor.borrow_mut().save(container);
                *self.detail.borrow_mut() = Some(item.clone());
                self.emit(BrowserEvent::SelectAndHold(item));
            }
        }
    }

    /// Leave the detail view and start restoring the list's scroll offset.
    /// Complete with [`finish_scroll_restore`](Self::finish_scroll_restore)
    /// once the returned retry is due.
    pub fn close_detail<T: ScrollTarget + ?Sized>(&self, container: &mut T) -> Option<PendingReapply> {
        self.detail.borrow_mut().take()?;
        self.anchor.borrow_mut().apply(container)
    }

    pub fn finish_scroll_restore<T: ScrollTarget + ?Sized>(
        &self,
        pending: PendingReapply,
        container: &mut T,
    ) {
        self.anchor.borrow_mut().reapply(pending, container);
    }

    // ── Internals ────────────────────────────────────────────────────────────

    async fn fetch_all(&self) -> RefreshReport {
        let pending = self
            .spec
            .slices
            .iter()
            .map(|slice| self.fetcher.fetch_list(slice.request.clone()));
        let results = join_all(pending).await;

        let filter_text = self.persisted_filter_text();
        let mut failures = Vec::new();
        let mut item_count = 0;

        for (idx, (slice, result)) in self.spec.slices.iter().zip(results).enumerate() {
            match result {
                Ok(page) => {
                    let updated_at = page
                        .server_timestamp
                        .filter(|ts| *ts > 0)
                        .unwrap_or_else(|| chrono::Utc::now().timestamp());
                    item_count += page.items.len();

                    let key = self.cache_key(slice);
                    let entry =
                        ListCacheEntry::populated(page.items.clone(), updated_at, filter_text.clone());
                    if let Err(e) = self.store.set(&key, entry) {
                        warn!("failed to persist cache slot {}: {}", key, e);
                    }
                    debug!("{}: {} items", key, page.items.len());
                    self.replace_slice(idx, SliceSnapshot::new(page.items, updated_at));
                }
                Err(cause) => {
                    warn!("{}: {} failed: {}", self.spec.kind, slice.name, cause);
                    self.replace_slice(idx, SliceSnapshot::default());
                    let err = BrowserError::FetchFailed {
                        slice: slice.name.clone(),
                        cause,
                    };
                    self.show_error(err.to_string());
                    failures.push(err);
                }
            }
        }

        RefreshReport {
            failures,
            item_count,
        }
    }

    /// Cap every slice and announce it the first time this list kind is
    /// truncated during the editing session.
    fn apply_preview_cap(&self) {
        let cap = self.preview_cap;
        let mut truncated = false;
        {
            let mut slices = self.slices.borrow_mut();
            for slice in slices.iter_mut() {
                if slice.items.len() > cap {
                    *slice = SliceSnapshot::new(slice.items[..cap].to_vec(), slice.last_updated_at);
                    truncated = true;
                }
            }
        }
        let kind = self.spec.kind;
        if self.has_items() {
            self.registry.mark_loaded(kind);
        }
        if truncated && self.registry.mark_truncated(kind) {
            self.show_info(format!(
                "Dashboard is being edited; only the first {} items are shown",
                cap
            ));
        }
    }

    /// Cached entries for every slice, or `None` if any slice was never
    /// populated.
    fn cached_entries(&self) -> Option<Vec<ListCacheEntry>> {
        self.spec
            .slices
            .iter()
            .map(|slice| {
                self.store
                    .get(&self.cache_key(slice))
                    .filter(|entry| entry.last_updated_at() > 0)
            })
            .collect()
    }

    /// What preview mode may serve instead of fetching.
    fn preview_snapshot(&self) -> Option<Vec<ListCacheEntry>> {
        if !self.is_preview() {
            return None;
        }
        let entries = self.cached_entries()?;
        entries.iter().any(ListCacheEntry::has_items).then_some(entries)
    }

    fn load_entries(&self, entries: Vec<ListCacheEntry>) {
        let snapshots = entries
            .into_iter()
            .map(|entry| {
                let updated_at = entry.last_updated_at();
                SliceSnapshot::new(entry.into_items().unwrap_or_default(), updated_at)
            })
            .collect();
        *self.slices.borrow_mut() = snapshots;
    }

    fn replace_slice(&self, idx: usize, snapshot: SliceSnapshot) {
        if let Some(slot) = self.slices.borrow_mut().get_mut(idx) {
            *slot = snapshot;
        }
    }

    fn has_items(&self) -> bool {
        self.slices.borrow().iter().any(|s| !s.items.is_empty())
    }

    fn cache_key(&self, slice: &SliceSpec) -> CacheKey {
        match &slice.request.scope {
            Some(scope) => CacheKey::scoped(slice.request.kind, scope.clone(), self.account.clone()),
            None => CacheKey::new(slice.request.kind, self.account.clone()),
        }
    }

    fn persisted_filter_text(&self) -> Option<String> {
        let text = self.filter_text.borrow();
        (!text.is_empty()).then(|| text.clone())
    }

    fn reject_busy(&self) -> BrowserError {
        warn!("{}: refresh rejected, one is already running", self.spec.kind);
        self.show_error(REFRESH_IN_PROGRESS);
        BrowserError::RefreshInProgress
    }

    fn hide_detail(&self) {
        if self.detail.borrow_mut().take().is_some() {
            self.emit(BrowserEvent::DetailHidden);
        }
    }

    fn scroll_to_top(&self) {
        self.anchor.borrow_mut().reset();
        self.emit(BrowserEvent::ScrollToTop);
    }

    fn show_info(&self, message: impl Into<String>) {
        let notice = Notice::info(message);
        self.notices.borrow_mut().show(&notice);
        self.emit(BrowserEvent::Notice(notice));
    }

    fn show_error(&self, message: impl Into<String>) {
        let notice = Notice::error(message);
        self.notices.borrow_mut().show(&notice);
        self.emit(BrowserEvent::Notice(notice));
        self.scroll_to_top();
    }

    fn emit(&self, event: BrowserEvent) {
        let _ = self.events.send(event);
    }
}
