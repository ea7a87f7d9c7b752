use std::path::PathBuf;

const APP_DIR: &str = "media-browser";

/// Cache and log files. XDG layout on every unix, macOS included.
pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    let base = home().join(".local").join("share");
    #[cfg(windows)]
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR)
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    let base = home().join(".config");
    #[cfg(windows)]
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(APP_DIR)
}

#[cfg(unix)]
fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(std::env::temp_dir)
}
