//! StationList component — top pane listing the catalog.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use tuner_core::catalog::CatalogItem;
use tuner_core::session::PlaybackStatus;
use tuner_core::source::SourceState;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_default, style_focused_border, style_muted, style_secondary, style_selected,
        style_selected_focused, style_unfocused_border, C_CONNECTING, C_ERROR, C_PLAYING,
    },
    widgets::scrollable_list::ScrollableList,
};

pub struct StationList {
    list: ScrollableList<CatalogItem>,
    list_state: ListState,
    /// Jump to this item id once the catalog arrives.
    pending_restore: Option<String>,
}

impl StationList {
    pub fn new(restore_id: Option<String>) -> Self {
        Self {
            list: ScrollableList::new(),
            list_state: ListState::default(),
            pending_restore: restore_id,
        }
    }

    /// Update items from the catalog snapshot and restore the persisted
    /// selection on first sync.
    pub fn sync_items(&mut self, state: &AppState) {
        self.list.set_items(state.items.clone());
        if let Some(id) = self.pending_restore.take() {
            if let Some(pos) = self.list.items.iter().position(|i| i.id == id) {
                self.list.set_selected(pos);
            }
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.list.selected_item().map(|i| i.id.as_str())
    }

    fn render_item(
        &self,
        item: &CatalogItem,
        is_selected: bool,
        focused: bool,
        state: &AppState,
        width: usize,
    ) -> ListItem<'static> {
        let (glyph, glyph_style) = if state.is_active(&item.id) {
            match state.playback_status {
                PlaybackStatus::Connecting => ("◔", Style::default().fg(C_CONNECTING)),
                _ => ("▶", Style::default().fg(C_PLAYING)),
            }
        } else if state.current_item_id() == Some(item.id.as_str())
            && state.playback_status == PlaybackStatus::Error
        {
            ("⛔", Style::default().fg(C_ERROR))
        } else {
            (" ", style_muted())
        };

        let row_style = if is_selected && focused {
            style_selected_focused()
        } else if is_selected {
            style_selected()
        } else {
            style_default()
        };

        let title = truncate(&item.title, width.saturating_sub(16));
        let mut spans = vec![
            Span::raw(" "),
            Span::styled(glyph.to_string(), glyph_style),
            Span::raw(" "),
            Span::styled(title, row_style),
        ];
        if let Some(subtitle) = &item.subtitle {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                truncate(subtitle, width / 3),
                style_secondary(),
            ));
        }
        if !item.playable {
            spans.push(Span::styled("  (unavailable)", style_muted()));
        }

        let row_bg = if is_selected {
            row_style
        } else {
            Style::default()
        };
        ListItem::new(Line::from(spans)).style(row_bg)
    }
}

impl Component for StationList {
    fn id(&self) -> ComponentId {
        ComponentId::StationList
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Char('g') | KeyCode::Home => self.list.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(item) = self.list.selected_item() {
                    if item.playable {
                        return vec![Action::TogglePlayback(item.id.clone())];
                    }
                }
            }
            _ => {}
        }
        vec![]
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
            .title(format!(" stations ({}) ", self.list.len()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.is_empty() {
            let msg = match state.source_state {
                SourceState::Failed => "  catalog load failed",
                SourceState::Initialized => "  catalog is empty",
                _ => "  loading catalog…",
            };
            frame.render_widget(Paragraph::new(Span::styled(msg, style_muted())), inner);
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let sel_in_view = self
            .list
            .selected
            .saturating_sub(self.list.scroll_offset)
            .min(content_h.saturating_sub(1));

        let rows: Vec<ListItem> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .enumerate()
            .map(|(view_row, (_, item))| {
                self.render_item(
                    item,
                    view_row == sel_in_view,
                    focused,
                    state,
                    inner.width as usize,
                )
            })
            .collect();

        let list = List::new(rows);
        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(list, inner, &mut self.list_state);
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
    use tuner_core::catalog::builtin_items;

    fn state_with_catalog() -> AppState {
        let mut state = AppState::new();
        state.items = builtin_items();
        state.source_state = SourceState::Initialized;
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_enter_toggles_selected() {
        let state = state_with_catalog();
        let mut list = StationList::new(None);
        list.sync_items(&state);

        list.handle_key(key(KeyCode::Down), &state);
        let actions = list.handle_key(key(KeyCode::Enter), &state);
        assert_eq!(actions, vec![Action::TogglePlayback("KQNA".to_string())]);
    }

    #[test]
    fn test_enter_on_empty_list_is_noop() {
        let state = AppState::new();
        let mut list = StationList::new(None);
        list.sync_items(&state);
        assert!(list.handle_key(key(KeyCode::Enter), &state).is_empty());
    }

    #[test]
    fn test_unplayable_item_is_not_toggled() {
        let mut state = state_with_catalog();
        state.items[0].playable = false;
        let mut list = StationList::new(None);
        list.sync_items(&state);
        assert!(list.handle_key(key(KeyCode::Enter), &state).is_empty());
    }

    #[test]
    fn test_restore_preselects_persisted_item() {
        let state = state_with_catalog();
        let mut list = StationList::new(Some("KUGO".to_string()));
        list.sync_items(&state);
        assert_eq!(list.selected_id(), Some("KUGO"));

        // Restore happens once; later syncs keep the user's cursor.
        list.handle_key(key(KeyCode::Char('g')), &state);
        list.sync_items(&state);
        assert_eq!(list.selected_id(), Some("KPPV"));
    }

    #[test]
    fn test_truncate_width() {
        assert_eq!(truncate("short", 20), "short");
        let cut = truncate("a very long station title", 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
    }
}
