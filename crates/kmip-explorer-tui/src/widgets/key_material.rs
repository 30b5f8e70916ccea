//! Key material viewer.
//!
//! Shows fetched content either decoded (text, hex or PEM) or as the raw
//! structured dump. Tab switches between the two, `c` copies what is shown.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use kmip_explorer_core::ManagedObject;

use super::centered_rect;
use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct KeyMaterialView {
    id: String,
    object: ManagedObject,
    raw: bool,
    /// Rendered text for the current format.
    content: String,
    scroll: u16,
}

impl KeyMaterialView {
    pub fn new(id: String, object: ManagedObject) -> Self {
        let mut view = Self {
            id,
            object,
            raw: false,
            content: String::new(),
            scroll: 0,
        };
        view.rebuild();
        view
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    fn rebuild(&mut self) {
        let rendered = if self.raw {
            self.object.render_raw()
        } else {
            self.object.render_decoded()
        };
        self.content = rendered.unwrap_or_else(|e| format!("Error: {e}"));
        self.scroll = 0;
    }
}

impl Component for KeyMaterialView {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Tab => {
                self.raw = !self.raw;
                self.rebuild();
                None
            }
            KeyCode::Char('c') => Some(Action::CopyToClipboard(self.content.clone())),
            KeyCode::Esc | KeyCode::Enter => Some(Action::CloseMaterial),
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = (area.width / 2).max(70).min(area.width.saturating_sub(4));
        let height = area.height.saturating_sub(4);
        let panel = centered_rect(area, width, height);

        frame.render_widget(Clear, panel);
        let format = if self.raw { "raw" } else { "decoded" };
        let block = Block::default()
            .title(format!(" Material {} ({format}) ", self.id))
            .title_style(theme::title_style())
            .title_bottom(Line::from(vec![
                Span::styled(" <c> ", theme::key_hint_key()),
                Span::styled("Copy ", theme::key_hint()),
                Span::styled(" <tab> ", theme::key_hint_key()),
                Span::styled("Switch format ", theme::key_hint()),
                Span::styled(" <esc> ", theme::key_hint_key()),
                Span::styled("Close ", theme::key_hint()),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));

        let paragraph = Paragraph::new(self.content.as_str())
            .style(Style::default().fg(theme::DIM_WHITE))
            .block(block)
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, panel);
    }

    fn id(&self) -> &'static str {
        "key-material"
    }
}
