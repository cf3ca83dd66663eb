//! Playback transport — owns the mpv child process and the write side of
//! the `PlayerSession`.
//!
//! Commands arrive on an mpsc channel; a 1 s tick advances the position
//! stream while playing and notices child exit. One child at a time: any
//! play kills the previous process before spawning.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use tuner_core::catalog::CatalogItem;
use tuner_core::platform;
use tuner_core::session::{PlaybackStatus, PlayerSession};
use tuner_core::source::Source;

#[derive(Debug, Clone)]
pub enum TransportCommand {
    Play { id: String },
    /// Play `id`, or stop if it is already the active item.
    Toggle { id: String },
    Stop,
}

pub fn start(
    source: Arc<Source>,
    session: Arc<PlayerSession>,
    volume: f32,
) -> mpsc::Sender<TransportCommand> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(run(source, session, volume, rx));
    tx
}

struct Transport {
    source: Arc<Source>,
    session: Arc<PlayerSession>,
    volume: f32,
    current: Option<CatalogItem>,
    child: Option<Child>,
    status: PlaybackStatus,
    position_secs: f64,
}

async fn run(
    source: Arc<Source>,
    session: Arc<PlayerSession>,
    volume: f32,
    mut rx: mpsc::Receiver<TransportCommand>,
) {
    let mut transport = Transport {
        source,
        session,
        volume,
        current: None,
        child: None,
        status: PlaybackStatus::Idle,
        position_secs: 0.0,
    };

    let mut tick = interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            cmd = rx.recv() => {
                let Some(cmd) = cmd else { break };
                transport.handle(cmd).await;
            }
            _ = tick.tick() => {
                transport.on_tick().await;
            }
        }
    }

    transport.kill_child().await;
}

impl Transport {
    async fn handle(&mut self, cmd: TransportCommand) {
        match cmd {
            TransportCommand::Play { id } => self.play(&id).await,
            TransportCommand::Toggle { id } => {
                let active = self.current.as_ref().map(|i| i.id == id).unwrap_or(false)
                    && matches!(
                        self.status,
                        PlaybackStatus::Playing | PlaybackStatus::Connecting
                    );
                if active {
                    self.stop().await;
                } else {
                    self.play(&id).await;
                }
            }
            TransportCommand::Stop => self.stop().await,
        }
    }

    async fn play(&mut self, id: &str) {
        let catalog = self.source.snapshot().await;
        let Some(item) = catalog.find(id) else {
            warn!("play request for unknown item {:?}", id);
            return;
        };
        if !item.playable {
            warn!("play request for unplayable item {:?}", id);
            return;
        }

        self.kill_child().await;
        self.current = Some(item.clone());
        self.position_secs = 0.0;
        self.session.set_now_playing(Some(item));
        self.session.set_position(0.0);
        self.set_status(PlaybackStatus::Connecting);

        match self.spawn_mpv(&item.media_uri) {
            Ok(child) => {
                info!("playing {} ({})", item.title, item.media_uri);
                self.child = Some(child);
                self.set_status(PlaybackStatus::Playing);
            }
            Err(e) => {
                warn!("mpv spawn failed: {}", e);
                self.set_status(PlaybackStatus::Error);
            }
        }
    }

    async fn stop(&mut self) {
        // Metadata stays on screen; position freezes where it was.
        self.kill_child().await;
        self.set_status(PlaybackStatus::Idle);
        info!("playback stopped");
    }

    fn spawn_mpv(&self, uri: &str) -> anyhow::Result<Child> {
        let mpv = platform::find_mpv_binary()
            .ok_or_else(|| anyhow::anyhow!("mpv binary not found beside exe or on PATH"))?;
        let vol_arg = format!(
            "--volume={}",
            (self.volume * 100.0).clamp(0.0, 100.0).round() as i64
        );
        let child = Command::new(mpv)
            .arg("--no-video")
            .arg("--quiet")
            .arg(vol_arg)
            .arg(uri)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        Ok(child)
    }

    async fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill().await;
        }
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        self.status = status;
        self.session.set_status(status);
    }

    async fn on_tick(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }

        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(exit)) => {
                    warn!("mpv exited unexpectedly: {:?}", exit.code());
                    self.child = None;
                    self.set_status(PlaybackStatus::Error);
                    return;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("mpv status check failed: {}", e);
                }
            }
        }

        self.position_secs += 1.0;
        self.session.set_position(self.position_secs);
    }
}
