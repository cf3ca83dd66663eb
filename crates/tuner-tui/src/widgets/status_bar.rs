//! Status bar — bottom line with catalog state, keybindings, and the last
//! log line.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use tuner_core::source::SourceState;

use crate::app_state::AppState;
use crate::theme::{C_BADGE_ERR, C_BADGE_PENDING, C_BADGE_READY, C_MUTED, C_SECONDARY};

fn source_badge(state: SourceState) -> Span<'static> {
    let color = match state {
        SourceState::Initialized => C_BADGE_READY,
        SourceState::Failed => C_BADGE_ERR,
        SourceState::Uninitialized | SourceState::Initializing => C_BADGE_PENDING,
    };
    Span::styled(
        format!(" {} ", state.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let keys = " ↑↓/jk select  Enter play/stop  Space toggle current  s stop  Tab pane  q quit";

    let mut spans = vec![
        source_badge(state.source_state),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ];

    if let Some(log) = state.last_log.as_deref() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            log.to_string(),
            Style::default().fg(C_SECONDARY),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
