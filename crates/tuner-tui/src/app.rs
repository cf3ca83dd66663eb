//! App — component-based event loop.
//!
//! - `App` owns the components and `AppState` (shared read-only data).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks: terminal input, and one forwarder over the session/source watch
//!   channels.
//! - The loop draws a frame, then awaits the next message. Components return
//!   `Vec<Action>`; App dispatches each. Transport commands flow out through
//!   a separate `cmd_tx` channel.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tuner_core::session::{
    ControlIcon, NowPlayingMetadata, PersistentState, PlaybackStatus, PlayerSession,
};
use tuner_core::source::{Source, SourceState};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{now_playing::NowPlayingPanel, station_list::StationList},
    transport::TransportCommand,
    widgets::status_bar,
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Metadata(Option<NowPlayingMetadata>),
    Icon(ControlIcon),
    Position(f64),
    Status(PlaybackStatus),
    SourceState(SourceState),
}

pub struct App {
    state: AppState,
    station_list: StationList,
    now_playing: NowPlayingPanel,
    focus: ComponentId,
    source: Arc<Source>,
    session: Arc<PlayerSession>,
    cmd_tx: mpsc::Sender<TransportCommand>,
    persist_path: PathBuf,
    should_quit: bool,
}

impl App {
    pub fn new(
        source: Arc<Source>,
        session: Arc<PlayerSession>,
        cmd_tx: mpsc::Sender<TransportCommand>,
        persist_path: PathBuf,
    ) -> Self {
        let persisted = PersistentState::load(&persist_path);
        Self {
            state: AppState::new(),
            station_list: StationList::new(persisted.last_item_id),
            now_playing: NowPlayingPanel::new(),
            focus: ComponentId::StationList,
            source,
            session,
            cmd_tx,
            persist_path,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal ready, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: session + source subscriptions ───────────────────
        // All display-facing subscriptions live here; the task exits (and the
        // receivers are released) once the app drops its end of the channel.
        let sub_tx = tx.clone();
        let mut metadata_rx = self.session.metadata();
        let mut icon_rx = self.session.control_icon();
        let mut position_rx = self.session.position_secs();
        let mut status_rx = self.session.status();
        let mut source_rx = self.source.watch_state();
        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    changed = metadata_rx.changed() => {
                        if changed.is_err() { break; }
                        AppMessage::Metadata(metadata_rx.borrow_and_update().clone())
                    }
                    changed = icon_rx.changed() => {
                        if changed.is_err() { break; }
                        AppMessage::Icon(*icon_rx.borrow_and_update())
                    }
                    changed = position_rx.changed() => {
                        if changed.is_err() { break; }
                        AppMessage::Position(*position_rx.borrow_and_update())
                    }
                    changed = status_rx.changed() => {
                        if changed.is_err() { break; }
                        AppMessage::Status(*status_rx.borrow_and_update())
                    }
                    changed = source_rx.changed() => {
                        if changed.is_err() { break; }
                        AppMessage::SourceState(*source_rx.borrow_and_update())
                    }
                };
                if sub_tx.send(msg).await.is_err() {
                    break;
                }
            }
            debug!("subscription forwarder detached");
        });

        // The source may have settled before we subscribed; watch channels
        // only deliver changes, so pick up the current state once.
        self.state.source_state = self.source.state();
        self.sync_catalog().await;
        info!("tuner UI running");

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }
            let Some(msg) = rx.recv().await else { break };
            self.handle_message(msg).await;
        }

        // Dropping the receiver detaches both background tasks.
        drop(rx);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    async fn sync_catalog(&mut self) {
        if self.state.source_state == SourceState::Initialized && self.state.items.is_empty() {
            let catalog = self.source.snapshot().await;
            self.state.items = catalog.items().to_vec();
            self.station_list.sync_items(&self.state);
            info!("catalog ready: {} items", self.state.items.len());
        }
    }

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                if key.kind == KeyEventKind::Release {
                    return;
                }
                let actions = self.handle_key(key);
                for action in actions {
                    self.dispatch(action).await;
                }
            }
            // Resize redraws on the next frame; nothing to track.
            AppMessage::Event(_) => {}
            AppMessage::Metadata(meta) => self.state.now_playing = meta,
            AppMessage::Icon(icon) => self.state.control_icon = icon,
            AppMessage::Position(secs) => self.state.position_secs = secs,
            AppMessage::Status(status) => {
                self.state.playback_status = status;
                if status == PlaybackStatus::Error {
                    self.state.last_log = Some("playback failed — see log".to_string());
                }
            }
            AppMessage::SourceState(state) => {
                self.state.source_state = state;
                if state == SourceState::Failed {
                    self.state.last_log = Some("catalog load failed — see log".to_string());
                }
                self.sync_catalog().await;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('q') => return vec![Action::Quit],
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Action::Quit]
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    ComponentId::StationList => ComponentId::NowPlaying,
                    ComponentId::NowPlaying => ComponentId::StationList,
                };
                return vec![];
            }
            KeyCode::Char('s') => return vec![Action::Stop],
            // Space toggles the current item from anywhere, mirroring the
            // transport-control key on the now-playing panel.
            KeyCode::Char(' ') if self.focus == ComponentId::StationList => {
                return self.now_playing.handle_key(key, &self.state);
            }
            _ => {}
        }

        match self.focus {
            ComponentId::StationList => self.station_list.handle_key(key, &self.state),
            ComponentId::NowPlaying => self.now_playing.handle_key(key, &self.state),
        }
    }

    async fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Stop => {
                if self.cmd_tx.send(TransportCommand::Stop).await.is_err() {
                    warn!("transport command channel closed");
                }
            }
            Action::TogglePlayback(id) => {
                self.remember_last(&id).await;
                if self
                    .cmd_tx
                    .send(TransportCommand::Toggle { id })
                    .await
                    .is_err()
                {
                    warn!("transport command channel closed");
                }
            }
        }
    }

    async fn remember_last(&self, id: &str) {
        let persist = PersistentState {
            last_item_id: Some(id.to_string()),
        };
        if let Err(e) = persist.save(&self.persist_path).await {
            warn!("failed to save session state: {}", e);
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(7),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.station_list.draw(
            frame,
            rows[0],
            self.focus == ComponentId::StationList,
            &self.state,
        );
        self.now_playing.draw(
            frame,
            rows[1],
            self.focus == ComponentId::NowPlaying,
            &self.state,
        );
        status_bar::draw_keys_bar(frame, rows[2], &self.state);
    }
}
