use thiserror::Error;

use crate::fetch::FetchError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BrowserError {
    /// A refresh was requested while another one was still running.
    #[error("refresh already in progress")]
    RefreshInProgress,

    /// One slice of a list could not be fetched.
    #[error("{slice} could not be loaded: {cause}")]
    FetchFailed { slice: String, cause: FetchError },
}
