//! Gesture disambiguation and list-refresh coordination for media lists.

pub mod action;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod gesture;
pub mod http;
pub mod notice;
pub mod preview;
pub mod refresh;
pub mod scroll_anchor;
