//! NowPlayingPanel — bottom pane showing the current item.
//!
//! Renders whatever the three session streams last delivered: metadata
//! (title, subtitle, duration, artwork), control icon, and position. The
//! panel holds no playback state of its own.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use tuner_core::session::{format_mss, ArtworkSource, PlaybackStatus};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_default, style_focused_border, style_muted, style_secondary,
        style_unfocused_border, C_ACCENT, C_CONNECTING, C_ERROR, C_MUTED, C_PLAYING,
    },
};

pub struct NowPlayingPanel;

impl NowPlayingPanel {
    pub fn new() -> Self {
        Self
    }

    fn icon_span(&self, state: &AppState) -> Span<'static> {
        let color = match state.playback_status {
            PlaybackStatus::Playing => C_PLAYING,
            PlaybackStatus::Connecting | PlaybackStatus::Paused => C_CONNECTING,
            PlaybackStatus::Error => C_ERROR,
            PlaybackStatus::Idle => C_MUTED,
        };
        Span::styled(
            state.control_icon.glyph().to_string(),
            Style::default().fg(color),
        )
    }
}

impl Component for NowPlayingPanel {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        match key.code {
            // Transport control: acts on the last-observed item. A strict
            // no-op until metadata has been observed at least once.
            KeyCode::Char(' ') | KeyCode::Enter => match state.current_item_id() {
                Some(id) => vec![Action::TogglePlayback(id.to_string())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let border_style = if focused {
            style_focused_border()
        } else {
            style_unfocused_border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" now playing ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(meta) = state.now_playing.as_ref() else {
            frame.render_widget(
                Paragraph::new(Span::styled("  nothing playing", style_muted())),
                inner,
            );
            return;
        };

        let width = inner.width as usize;
        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::from(vec![
            Span::raw(" "),
            self.icon_span(state),
            Span::raw(" "),
            Span::styled(
                truncate(&meta.title, width.saturating_sub(6)),
                style_default().add_modifier(Modifier::BOLD),
            ),
        ]));

        // Subtitle row is hidden entirely when absent.
        if let Some(subtitle) = &meta.subtitle {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(
                    truncate(subtitle, width.saturating_sub(6)),
                    style_secondary(),
                ),
            ]));
        }

        let art = match &meta.art {
            ArtworkSource::Placeholder => Span::styled("   ♪ no artwork", style_muted()),
            ArtworkSource::Remote(uri) => Span::styled(
                format!("   art {}", truncate(uri, width.saturating_sub(10))),
                Style::default().fg(C_ACCENT),
            ),
        };
        lines.push(Line::from(art));

        lines.push(Line::from(vec![
            Span::raw("   "),
            Span::styled(format_mss(state.position_secs), style_default()),
            Span::styled(" / ", style_muted()),
            Span::styled(meta.duration_text.clone(), style_secondary()),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 || s.width() <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in s.chars() {
        let w = ch.to_string().width();
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuner_core::catalog::CatalogItem;
    use tuner_core::session::NowPlayingMetadata;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_control_is_noop_before_metadata() {
        let state = AppState::new();
        let mut panel = NowPlayingPanel::new();
        assert!(panel.handle_key(key(KeyCode::Char(' ')), &state).is_empty());
        assert!(panel.handle_key(key(KeyCode::Enter), &state).is_empty());
    }

    #[test]
    fn test_control_toggles_observed_item() {
        let mut state = AppState::new();
        let item = CatalogItem::station("KDMM", "KDMM", "http://example.org/kdmm");
        state.now_playing = Some(NowPlayingMetadata::from_item(&item));

        let mut panel = NowPlayingPanel::new();
        let actions = panel.handle_key(key(KeyCode::Char(' ')), &state);
        assert_eq!(actions, vec![Action::TogglePlayback("KDMM".to_string())]);
    }
}
