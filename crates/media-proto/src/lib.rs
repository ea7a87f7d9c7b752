pub mod cache;
pub mod config;
pub mod platform;
pub mod protocol;
