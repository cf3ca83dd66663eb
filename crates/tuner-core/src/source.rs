//! Catalog sources — each builds its catalog exactly once per process.
//!
//! `load()` is safe to call repeatedly and concurrently: the backing seed
//! (item table or feed URL) sits behind a claim-once guard, so the first
//! caller to take it populates the catalog and every other caller returns
//! without side effects. Lifecycle is observable through a watch channel.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{info, warn};

use crate::catalog::{builtin_items, Catalog, CatalogItem, DownloadStatus};

/// Lifecycle of a catalog source. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceState {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
    /// Remote fetch or parse failed. Terminal — the seed URL has been
    /// consumed, so recovery needs a fresh source instance.
    Failed,
}

impl SourceState {
    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "idle",
            Self::Initializing => "loading",
            Self::Initialized => "ready",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("catalog fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

// ── shared source internals ───────────────────────────────────────────────────

/// State + contents common to every source kind.
struct SourceInner {
    state_tx: watch::Sender<SourceState>,
    catalog: RwLock<Arc<Catalog>>,
}

impl SourceInner {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(SourceState::Uninitialized);
        Self {
            state_tx,
            catalog: RwLock::new(Arc::new(Catalog::default())),
        }
    }

    fn state(&self) -> SourceState {
        *self.state_tx.borrow()
    }

    fn watch_state(&self) -> watch::Receiver<SourceState> {
        self.state_tx.subscribe()
    }

    async fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().await.clone()
    }

    async fn install(&self, items: Vec<CatalogItem>) {
        *self.catalog.write().await = Arc::new(Catalog::new(items));
        self.state_tx.send_replace(SourceState::Initialized);
    }

    /// Resolves once the source settles: `true` for Initialized, `false`
    /// for Failed.
    async fn ready(&self) -> bool {
        let mut rx = self.state_tx.subscribe();
        match rx
            .wait_for(|s| matches!(s, SourceState::Initialized | SourceState::Failed))
            .await
        {
            Ok(state) => *state == SourceState::Initialized,
            Err(_) => false,
        }
    }
}

// ── static source ─────────────────────────────────────────────────────────────

/// Fixed, compiled-in catalog. Loading is infallible.
pub struct StaticSource {
    seed: Mutex<Option<Vec<CatalogItem>>>,
    inner: SourceInner,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::with_items(builtin_items())
    }

    /// A static source over an arbitrary item table (tests, embedding).
    pub fn with_items(items: Vec<CatalogItem>) -> Self {
        Self {
            seed: Mutex::new(Some(items)),
            inner: SourceInner::new(),
        }
    }

    /// Idempotent. The first caller to claim the seed builds the catalog;
    /// every other invocation returns with no side effects.
    pub async fn load(&self) {
        if self.inner.state() != SourceState::Uninitialized {
            return;
        }
        let Some(items) = self.seed.lock().await.take() else {
            return;
        };
        self.inner.state_tx.send_replace(SourceState::Initializing);
        info!("static catalog: installing {} items", items.len());
        self.inner.install(items).await;
    }

    pub fn state(&self) -> SourceState {
        self.inner.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<SourceState> {
        self.inner.watch_state()
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.inner.snapshot().await
    }

    pub async fn ready(&self) -> bool {
        self.inner.ready().await
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new()
    }
}

// ── remote source ─────────────────────────────────────────────────────────────

/// JSON catalog fetched over HTTP. One fetch attempt per process; a failed
/// attempt parks the source in `SourceState::Failed`.
pub struct RemoteSource {
    url: Mutex<Option<String>>,
    client: reqwest::Client,
    inner: SourceInner,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Mutex::new(Some(url.into())),
            client: reqwest::Client::new(),
            inner: SourceInner::new(),
        }
    }

    pub async fn load(&self) -> Result<(), SourceError> {
        if self.inner.state() != SourceState::Uninitialized {
            return Ok(());
        }
        let Some(url) = self.url.lock().await.take() else {
            return Ok(());
        };
        self.inner.state_tx.send_replace(SourceState::Initializing);
        info!("remote catalog: fetching {}", url);
        match self.fetch(&url).await {
            Ok(items) => {
                info!("remote catalog: installing {} items", items.len());
                self.inner.install(items).await;
                Ok(())
            }
            Err(e) => {
                warn!("remote catalog: {}", e);
                self.inner.state_tx.send_replace(SourceState::Failed);
                Err(e)
            }
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<CatalogItem>, SourceError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_remote_catalog(&body)
    }

    pub fn state(&self) -> SourceState {
        self.inner.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<SourceState> {
        self.inner.watch_state()
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        self.inner.snapshot().await
    }

    pub async fn ready(&self) -> bool {
        self.inner.ready().await
    }
}

// ── remote feed schema ────────────────────────────────────────────────────────

/// Intermediate structs matching the published JSON feed. Kept separate from
/// `CatalogItem` so the feed schema can diverge from the in-process type
/// without breaking either.
#[derive(Debug, Deserialize)]
struct RemoteCatalogFile {
    music: Vec<RemoteItem>,
}

#[derive(Debug, Deserialize)]
struct RemoteItem {
    id: String,
    title: String,
    #[serde(default)]
    artist: String,
    source: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    duration: Option<f64>,
}

pub fn parse_remote_catalog(content: &str) -> Result<Vec<CatalogItem>, SourceError> {
    let file: RemoteCatalogFile = serde_json::from_str(content)?;
    let items = file
        .music
        .into_iter()
        .map(|m| CatalogItem {
            id: m.id,
            title: m.title,
            subtitle: if m.artist.is_empty() {
                None
            } else {
                Some(m.artist)
            },
            duration_secs: m.duration.filter(|d| *d > 0.0),
            media_uri: m.source,
            art_uri: m.image,
            playable: true,
            download_status: DownloadStatus::NotDownloaded,
        })
        .collect();
    Ok(items)
}

// ── source selection ──────────────────────────────────────────────────────────

/// A catalog source of either kind, selected from config at startup.
pub enum Source {
    Static(StaticSource),
    Remote(RemoteSource),
}

impl Source {
    pub async fn load(&self) -> Result<(), SourceError> {
        match self {
            Self::Static(s) => {
                s.load().await;
                Ok(())
            }
            Self::Remote(r) => r.load().await,
        }
    }

    pub fn state(&self) -> SourceState {
        match self {
            Self::Static(s) => s.state(),
            Self::Remote(r) => r.state(),
        }
    }

    pub fn watch_state(&self) -> watch::Receiver<SourceState> {
        match self {
            Self::Static(s) => s.watch_state(),
            Self::Remote(r) => r.watch_state(),
        }
    }

    pub async fn snapshot(&self) -> Arc<Catalog> {
        match self {
            Self::Static(s) => s.snapshot().await,
            Self::Remote(r) => r.snapshot().await,
        }
    }

    pub async fn ready(&self) -> bool {
        match self {
            Self::Static(s) => s.ready().await,
            Self::Remote(r) => r.ready().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_empty_before_load() {
        let source = StaticSource::new();
        assert_eq!(source.state(), SourceState::Uninitialized);
        assert!(source.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_populates_once() {
        let source = StaticSource::new();
        source.load().await;
        assert_eq!(source.state(), SourceState::Initialized);

        let first = source.snapshot().await;
        assert_eq!(first.len(), 9);

        // Repeated loads are no-ops: same contents, same order.
        source.load().await;
        source.load().await;
        let again = source.snapshot().await;
        assert_eq!(first.items(), again.items());
    }

    #[tokio::test]
    async fn test_ready_resolves_after_load() {
        let source = Arc::new(StaticSource::new());
        let waiter = {
            let source = source.clone();
            tokio::spawn(async move { source.ready().await })
        };
        source.load().await;
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_state_never_moves_backward() {
        let source = StaticSource::new();
        let mut rx = source.watch_state();
        source.load().await;
        source.load().await;

        let mut last = SourceState::Uninitialized;
        while rx.has_changed().unwrap_or(false) {
            let state = *rx.borrow_and_update();
            let ok = match (last, state) {
                (SourceState::Uninitialized, _) => true,
                (SourceState::Initializing, SourceState::Initializing) => true,
                (SourceState::Initializing, SourceState::Initialized) => true,
                (SourceState::Initialized, SourceState::Initialized) => true,
                _ => false,
            };
            assert!(ok, "backward transition {:?} -> {:?}", last, state);
            last = state;
        }
        assert_eq!(source.state(), SourceState::Initialized);
    }

    #[test]
    fn test_parse_remote_catalog() {
        let json = r#"{
            "music": [
                {
                    "id": "wake_up_01",
                    "title": "Intro - The Way Of Waking Up",
                    "artist": "The Kyoto Connection",
                    "source": "https://example.org/media/intro.mp3",
                    "image": "https://example.org/media/art.jpg",
                    "duration": 90
                },
                {
                    "id": "drone_02",
                    "title": "Geisha",
                    "source": "https://example.org/media/geisha.mp3"
                }
            ]
        }"#;
        let items = parse_remote_catalog(json).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].subtitle.as_deref(), Some("The Kyoto Connection"));
        assert_eq!(items[0].duration_secs, Some(90.0));
        assert_eq!(items[0].art_uri, "https://example.org/media/art.jpg");
        assert!(items[1].subtitle.is_none());
        assert!(items[1].duration_secs.is_none());
        assert!(items[1].art_uri.is_empty());
    }

    #[test]
    fn test_parse_remote_catalog_malformed() {
        let err = parse_remote_catalog("{\"music\": 7}").unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_is_terminal() {
        // Nothing listens on port 1; the connection is refused locally.
        let source = RemoteSource::new("http://127.0.0.1:1/catalog.json");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, SourceError::Fetch(_)));
        assert_eq!(source.state(), SourceState::Failed);
        assert!(source.snapshot().await.is_empty());
        assert!(!source.ready().await);

        // A second load does not retry.
        assert!(source.load().await.is_ok());
        assert_eq!(source.state(), SourceState::Failed);
    }
}
