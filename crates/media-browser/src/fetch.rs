//! The remote fetch seam: one list page per request.

use futures_util::future::LocalBoxFuture;
use thiserror::Error;

use media_proto::protocol::{ListKind, MediaItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

impl Paging {
    pub fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::first(200)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub kind: ListKind,
    /// Narrows the list, e.g. the category whose playlists are wanted.
    pub scope: Option<String>,
    pub paging: Paging,
}

impl FetchRequest {
    pub fn new(kind: ListKind, paging: Paging) -> Self {
        Self {
            kind,
            scope: None,
            paging,
        }
    }

    pub fn scoped(kind: ListKind, scope: impl Into<String>, paging: Paging) -> Self {
        Self {
            kind,
            scope: Some(scope.into()),
            paging,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedPage {
    pub items: Vec<MediaItem>,
    /// Epoch seconds at which the backend last refreshed this list, if it
    /// reports one.
    pub server_timestamp: Option<i64>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with an error.
    #[error("{0}")]
    Domain(String),
}

/// Source of list pages. Futures are polled on the caller's thread, so
/// implementations need not be `Send`.
pub trait ListFetcher {
    fn fetch_list(&self, request: FetchRequest) -> LocalBoxFuture<'_, Result<FetchedPage, FetchError>>;
}
