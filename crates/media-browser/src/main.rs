use std::sync::Arc;

use clap::Parser;
use tokio::sync::{mpsc, watch};

use media_browser::action::BrowserEvent;
use media_browser::fetch::Paging;
use media_browser::http::HttpListFetcher;
use media_browser::notice::NoticeKind;
use media_browser::preview::PreviewRegistry;
use media_browser::refresh::{ListRefreshCoordinator, ListSpec};
use media_proto::cache::FileCacheStore;
use media_proto::config::Config;
use media_proto::protocol::{AccountId, ListKind};

/// Load one media list (cache first) and print it.
#[derive(Debug, Parser)]
#[command(name = "media-browser", version, about = "Browse cached media lists", long_about = None)]
struct Cli {
    /// Forget the cached list and fetch it again.
    #[arg(long)]
    refresh: bool,
    /// Category whose playlists to list.
    #[arg(long, value_name = "ID", required_if_eq("kind", "category-playlists"))]
    category: Option<String>,
    /// List to show, e.g. playlist-favorites or devices.
    #[arg(value_name = "LIST_KIND", value_parser = parse_list_kind)]
    kind: ListKind,
    /// Only print items whose title or subtitle contains this text.
    filter: Option<String>,
}

fn parse_list_kind(slug: &str) -> Result<ListKind, String> {
    ListKind::from_slug(slug).ok_or_else(|| {
        let known: Vec<&str> = ListKind::ALL.iter().map(|k| k.slug()).collect();
        format!("unknown list kind (one of: {})", known.join(", "))
    })
}

impl Cli {
    fn list_spec(&self, paging: Paging) -> ListSpec {
        match (self.kind, &self.category) {
            (ListKind::CategoryPlaylists, Some(category)) => ListSpec::category(category, paging),
            (kind, _) => ListSpec::single(kind, paging),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let data_dir = media_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("media-browser.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG wins; otherwise keep the HTTP client stack at warn.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("media-browser log: {}", log_path.display());
    tracing::info!("media-browser starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {}", e);
        Config::default()
    });

    // ── Collaborators ────────────────────────────────────────────────────────
    let store = Arc::new(FileCacheStore::open(config.paths.cache_file.clone()));
    tracing::info!("list cache: {}", store.path().display());
    let fetcher = Arc::new(HttpListFetcher::new(&config.backend)?);
    // Not running inside a dashboard editor.
    let (_preview_tx, preview_rx) = watch::channel(false);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<BrowserEvent>();

    let paging = Paging::first(config.browser.items_limit);
    let spec = args.list_spec(paging);
    let primary = spec.slices.len() - 1;

    let coordinator = ListRefreshCoordinator::new(
        spec,
        AccountId::new(config.backend.account.clone()),
        fetcher,
        store,
        preview_rx,
        PreviewRegistry::new(),
        events_tx,
    )
    .configured(&config.browser);

    // ── Load the list ────────────────────────────────────────────────────────
    if args.refresh {
        coordinator.hard_refresh().await?;
    } else {
        coordinator.mount().await?;
    }
    if let Some(filter) = &args.filter {
        coordinator.set_filter(filter);
    }

    while let Ok(event) = events_rx.try_recv() {
        tracing::debug!("event: {:?}", event);
        if let BrowserEvent::Notice(notice) = event {
            let tag = match notice.kind {
                NoticeKind::Info => "info",
                NoticeKind::Error => "error",
            };
            eprintln!("[{}] {}", tag, notice.message);
        }
    }

    if let Some(view) = coordinator.filtered(primary) {
        for item in view.iter() {
            println!("{}\t{}\t{}", item.kind_name(), item.name(), item.uri());
        }
        tracing::info!("{} of {} items shown", view.len(), view.total_len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_kind_and_filter() {
        let cli = Cli::try_parse_from(["media-browser", "--refresh", "track-favorites", "blue"]).unwrap();
        assert!(cli.refresh);
        assert_eq!(cli.kind, ListKind::TrackFavorites);
        assert_eq!(cli.filter.as_deref(), Some("blue"));
        assert_eq!(cli.list_spec(Paging::default()).slices.len(), 1);
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["media-browser", "mixtapes"]).is_err());
    }

    #[test]
    fn test_category_playlists_needs_category() {
        assert!(Cli::try_parse_from(["media-browser", "category-playlists"]).is_err());
        let cli = Cli::try_parse_from(["media-browser", "--category", "jazz", "category-playlists"]).unwrap();
        assert_eq!(cli.list_spec(Paging::default()).slices.len(), 2);
    }
}
