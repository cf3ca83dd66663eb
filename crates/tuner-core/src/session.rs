//! Playback session — the observable state consumed by the now-playing UI.
//!
//! `PlayerSession` owns the write side of three independent observable
//! values (current metadata, control icon, position). The transport writes,
//! the UI subscribes to each value separately, and each write notifies only
//! its own stream.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::catalog::CatalogItem;

/// Detailed playback status as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing loaded / explicitly stopped
    Connecting, // child spawned, stream buffering
    Playing,
    Paused,
    Error, // failed to play or child died
}

/// Which glyph the transport control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlIcon {
    #[default]
    Play,
    Pause,
}

impl ControlIcon {
    /// Pause glyph while the stream is (or is becoming) audible, play glyph
    /// otherwise.
    pub fn for_status(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Playing | PlaybackStatus::Connecting => Self::Pause,
            PlaybackStatus::Paused | PlaybackStatus::Idle | PlaybackStatus::Error => Self::Play,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Play => "▶",
            Self::Pause => "⏸",
        }
    }
}

/// Where the artwork for an item comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkSource {
    /// No locator — the display layer draws its built-in placeholder.
    Placeholder,
    /// A locator to hand to an image loader.
    Remote(String),
}

impl ArtworkSource {
    pub fn from_locator(locator: &str) -> Self {
        if locator.is_empty() {
            Self::Placeholder
        } else {
            Self::Remote(locator.to_string())
        }
    }
}

/// Display projection of the item currently loaded in the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingMetadata {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Pre-formatted total length; "--:--" for live streams.
    pub duration_text: String,
    pub art: ArtworkSource,
}

impl NowPlayingMetadata {
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            duration_text: item
                .duration_secs
                .map(format_mss)
                .unwrap_or_else(|| "--:--".to_string()),
            art: ArtworkSource::from_locator(&item.art_uri),
        }
    }
}

/// Format seconds as "minutes:seconds". Negative input clamps to zero.
pub fn format_mss(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

// ── session ───────────────────────────────────────────────────────────────────

pub struct PlayerSession {
    metadata_tx: watch::Sender<Option<NowPlayingMetadata>>,
    icon_tx: watch::Sender<ControlIcon>,
    position_tx: watch::Sender<f64>,
    status_tx: watch::Sender<PlaybackStatus>,
}

impl PlayerSession {
    pub fn new() -> Self {
        let (metadata_tx, _) = watch::channel(None);
        let (icon_tx, _) = watch::channel(ControlIcon::Play);
        let (position_tx, _) = watch::channel(0.0);
        let (status_tx, _) = watch::channel(PlaybackStatus::Idle);
        Self {
            metadata_tx,
            icon_tx,
            position_tx,
            status_tx,
        }
    }

    // ── read side ─────────────────────────────────────────────────────────────

    pub fn metadata(&self) -> watch::Receiver<Option<NowPlayingMetadata>> {
        self.metadata_tx.subscribe()
    }

    pub fn control_icon(&self) -> watch::Receiver<ControlIcon> {
        self.icon_tx.subscribe()
    }

    pub fn position_secs(&self) -> watch::Receiver<f64> {
        self.position_tx.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<PlaybackStatus> {
        self.status_tx.subscribe()
    }

    pub fn current_item_id(&self) -> Option<String> {
        self.metadata_tx.borrow().as_ref().map(|m| m.id.clone())
    }

    // ── write side (transport only) ───────────────────────────────────────────

    pub fn set_now_playing(&self, item: Option<&CatalogItem>) {
        self.metadata_tx
            .send_replace(item.map(NowPlayingMetadata::from_item));
    }

    /// Publishes the status and the icon derived from it.
    pub fn set_status(&self, status: PlaybackStatus) {
        self.status_tx.send_replace(status);
        self.icon_tx.send_replace(ControlIcon::for_status(status));
    }

    pub fn set_position(&self, secs: f64) {
        self.position_tx.send_replace(secs);
    }
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self::new()
    }
}

// ── cross-run persistence ─────────────────────────────────────────────────────

/// Small cross-run state, JSON in the data dir. Missing or corrupt files
/// fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistentState {
    pub last_item_id: Option<String>,
}

impl PersistentState {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mss_zero() {
        assert_eq!(format_mss(0.0), "0:00");
    }

    #[test]
    fn test_format_mss_minute_carry() {
        assert_eq!(format_mss(125.0), "2:05");
        assert_eq!(format_mss(59.0), "0:59");
        assert_eq!(format_mss(60.0), "1:00");
        assert_eq!(format_mss(600.0), "10:00");
    }

    #[test]
    fn test_format_mss_negative_clamps() {
        assert_eq!(format_mss(-3.0), "0:00");
    }

    #[test]
    fn test_artwork_branch() {
        assert_eq!(ArtworkSource::from_locator(""), ArtworkSource::Placeholder);
        assert_eq!(
            ArtworkSource::from_locator("https://example.org/a.jpg"),
            ArtworkSource::Remote("https://example.org/a.jpg".to_string())
        );
    }

    #[test]
    fn test_metadata_projection() {
        let mut item = CatalogItem::station("KPPV", "KPPV 106.7 FM", "http://example.org/kppv");
        let meta = NowPlayingMetadata::from_item(&item);
        assert_eq!(meta.id, "KPPV");
        assert!(meta.subtitle.is_none());
        assert_eq!(meta.duration_text, "--:--");
        assert_eq!(meta.art, ArtworkSource::Placeholder);

        item.duration_secs = Some(125.0);
        item.art_uri = "https://example.org/kppv.png".to_string();
        let meta = NowPlayingMetadata::from_item(&item);
        assert_eq!(meta.duration_text, "2:05");
        assert!(matches!(meta.art, ArtworkSource::Remote(_)));
    }

    #[test]
    fn test_icon_for_status() {
        assert_eq!(
            ControlIcon::for_status(PlaybackStatus::Playing),
            ControlIcon::Pause
        );
        assert_eq!(
            ControlIcon::for_status(PlaybackStatus::Connecting),
            ControlIcon::Pause
        );
        assert_eq!(
            ControlIcon::for_status(PlaybackStatus::Idle),
            ControlIcon::Play
        );
        assert_eq!(
            ControlIcon::for_status(PlaybackStatus::Error),
            ControlIcon::Play
        );
    }

    #[tokio::test]
    async fn test_session_streams_independent() {
        let session = PlayerSession::new();
        assert!(session.metadata().borrow().is_none());
        assert!(session.current_item_id().is_none());

        let mut metadata_rx = session.metadata();
        let mut position_rx = session.position_secs();
        metadata_rx.mark_unchanged();
        position_rx.mark_unchanged();

        session.set_position(42.0);
        assert!(position_rx.has_changed().unwrap());
        assert!(!metadata_rx.has_changed().unwrap());
        assert_eq!(*position_rx.borrow_and_update(), 42.0);

        let item = CatalogItem::station("KDDL", "KDDL", "http://example.org/kddl");
        session.set_now_playing(Some(&item));
        assert!(metadata_rx.has_changed().unwrap());
        assert_eq!(session.current_item_id().as_deref(), Some("KDDL"));
    }

    #[tokio::test]
    async fn test_status_drives_icon() {
        let session = PlayerSession::new();
        let icon_rx = session.control_icon();
        session.set_status(PlaybackStatus::Playing);
        assert_eq!(*icon_rx.borrow(), ControlIcon::Pause);
        session.set_status(PlaybackStatus::Idle);
        assert_eq!(*icon_rx.borrow(), ControlIcon::Play);
    }
}
