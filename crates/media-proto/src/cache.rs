//! Persisted list snapshots, keyed by list identity and account identity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::protocol::{AccountId, ListKind, MediaItem};

/// Key of one cache slot: a list kind, an optional scope within it (e.g. the
/// category a playlist list belongs to), and the account it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub list: ListKind,
    pub scope: Option<String>,
    pub account: AccountId,
}

impl CacheKey {
    pub fn new(list: ListKind, account: AccountId) -> Self {
        Self {
            list,
            scope: None,
            account,
        }
    }

    pub fn scoped(list: ListKind, scope: impl Into<String>, account: AccountId) -> Self {
        Self {
            list,
            scope: Some(scope.into()),
            account,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}/{}@{}", self.list.slug(), scope, self.account),
            None => write!(f, "{}@{}", self.list.slug(), self.account),
        }
    }
}

/// One persisted list snapshot.
///
/// `items` and `last_updated_at` are only ever written together; a zero
/// timestamp means the slot was never populated and carries no items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListCacheEntry {
    #[serde(default)]
    items: Option<Vec<MediaItem>>,
    #[serde(default)]
    last_updated_at: i64,
    #[serde(default)]
    filter_text: Option<String>,
}

impl ListCacheEntry {
    /// A populated snapshot. A non-positive timestamp yields an empty entry.
    pub fn populated(items: Vec<MediaItem>, last_updated_at: i64, filter_text: Option<String>) -> Self {
        if last_updated_at <= 0 {
            return Self {
                filter_text,
                ..Self::default()
            };
        }
        Self {
            items: Some(items),
            last_updated_at,
            filter_text,
        }
    }

    pub fn items(&self) -> Option<&[MediaItem]> {
        self.items.as_deref()
    }

    pub fn into_items(self) -> Option<Vec<MediaItem>> {
        self.items
    }

    pub fn last_updated_at(&self) -> i64 {
        self.last_updated_at
    }

    pub fn filter_text(&self) -> Option<&str> {
        self.filter_text.as_deref()
    }

    /// True when the slot holds a snapshot with at least one item.
    pub fn has_items(&self) -> bool {
        self.last_updated_at > 0 && self.items.as_ref().is_some_and(|i| !i.is_empty())
    }

    /// Re-establish the timestamp/items invariant on data read from disk.
    fn normalized(self) -> Self {
        match (self.last_updated_at > 0, self.items) {
            (true, Some(items)) => Self {
                items: Some(items),
                ..self
            },
            _ => Self {
                items: None,
                last_updated_at: 0,
                filter_text: self.filter_text,
            },
        }
    }
}

/// Durable key/value store for list snapshots.
///
/// `get` never fails: a slot that cannot be read is reported as absent.
pub trait ListCacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<ListCacheEntry>;
    fn set(&self, key: &CacheKey, entry: ListCacheEntry) -> anyhow::Result<()>;
    fn clear(&self, key: &CacheKey) -> anyhow::Result<()>;
}

/// In-process store; contents live as long as the value.
#[derive(Default)]
pub struct MemoryCacheStore {
    slots: Mutex<HashMap<String, ListCacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListCacheStore for MemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Option<ListCacheEntry> {
        let slots = self.slots.lock().ok()?;
        slots.get(&key.to_string()).cloned()
    }

    fn set(&self, key: &CacheKey, entry: ListCacheEntry) -> anyhow::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("cache store lock poisoned"))?;
        slots.insert(key.to_string(), entry);
        Ok(())
    }

    fn clear(&self, key: &CacheKey) -> anyhow::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("cache store lock poisoned"))?;
        slots.remove(&key.to_string());
        Ok(())
    }
}

/// JSON file backed store. The whole map is loaded once and rewritten on
/// every `set`/`clear`.
pub struct FileCacheStore {
    path: PathBuf,
    slots: Mutex<HashMap<String, ListCacheEntry>>,
}

impl FileCacheStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let slots = Self::load(&path);
        Self {
            path,
            slots: Mutex::new(slots),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> HashMap<String, ListCacheEntry> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str::<HashMap<String, ListCacheEntry>>(&content) {
            Ok(map) => map
                .into_iter()
                .map(|(k, v)| (k, v.normalized()))
                .collect(),
            Err(e) => {
                tracing::warn!("ignoring unreadable list cache {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn save(&self, slots: &HashMap<String, ListCacheEntry>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(slots)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ListCacheStore for FileCacheStore {
    fn get(&self, key: &CacheKey) -> Option<ListCacheEntry> {
        let slots = self.slots.lock().ok()?;
        slots.get(&key.to_string()).cloned()
    }

    fn set(&self, key: &CacheKey, entry: ListCacheEntry) -> anyhow::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("cache store lock poisoned"))?;
        slots.insert(key.to_string(), entry);
        self.save(&slots)
    }

    fn clear(&self, key: &CacheKey) -> anyhow::Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("cache store lock poisoned"))?;
        if slots.remove(&key.to_string()).is_some() {
            self.save(&slots)?;
        }
        Ok(())
    }
}
