//! AppState — shared read-only data passed to all components during
//! render/event. Only the App event loop writes to it.

use tuner_core::catalog::CatalogItem;
use tuner_core::session::{ControlIcon, NowPlayingMetadata, PlaybackStatus};
use tuner_core::source::SourceState;

pub struct AppState {
    /// Catalog snapshot; empty until the source reports Initialized.
    pub items: Vec<CatalogItem>,
    pub source_state: SourceState,
    /// Projection of the current item; `None` until first playback.
    pub now_playing: Option<NowPlayingMetadata>,
    pub control_icon: ControlIcon,
    pub position_secs: f64,
    pub playback_status: PlaybackStatus,
    /// Last log line shown in the status bar.
    pub last_log: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            source_state: SourceState::Uninitialized,
            now_playing: None,
            control_icon: ControlIcon::Play,
            position_secs: 0.0,
            playback_status: PlaybackStatus::Idle,
            last_log: None,
        }
    }

    /// Id of the item currently loaded in the transport, if any.
    pub fn current_item_id(&self) -> Option<&str> {
        self.now_playing.as_ref().map(|m| m.id.as_str())
    }

    /// True when `id` is the active (audible or buffering) item.
    pub fn is_active(&self, id: &str) -> bool {
        self.current_item_id() == Some(id)
            && matches!(
                self.playback_status,
                PlaybackStatus::Playing | PlaybackStatus::Connecting
            )
    }
}
