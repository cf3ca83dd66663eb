//! Actions — produced by components, dispatched by the App event loop.

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Toggle playback of a specific catalog item: play it, or stop if it
    /// is already the active item.
    TogglePlayback(String),
    /// Stop whatever is playing.
    Stop,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentId {
    StationList,
    NowPlaying,
}
