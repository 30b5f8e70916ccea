//! Yes/No confirmation for destructive operations. Focus starts on "No".

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use kmip_explorer_core::Prompt;

use super::centered_rect;
use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct ConfirmDialog {
    prompt: Prompt,
    yes_focused: bool,
}

impl ConfirmDialog {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            prompt,
            yes_focused: false,
        }
    }
}

impl Component for ConfirmDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.yes_focused = !self.yes_focused;
                None
            }
            KeyCode::Char('y' | 'Y') => Some(Action::ConfirmAnswer(true)),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmAnswer(false)),
            KeyCode::Enter => Some(Action::ConfirmAnswer(self.yes_focused)),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let dialog = centered_rect(area, width, 7);

        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(format!(" {} ", self.prompt.title))
            .title_style(theme::title_style())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.prompt.question.as_str(),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Yes ", theme::button(self.yes_focused, true)),
                Span::raw("    "),
                Span::styled(" No ", theme::button(!self.yes_focused, true)),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
    }

    fn id(&self) -> &'static str {
        "confirm"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn dialog() -> ConfirmDialog {
        ConfirmDialog::new(Prompt {
            title: "Confirm Destroy".into(),
            question: "Destroy object 42 ?".into(),
        })
    }

    fn press(dialog: &mut ConfirmDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn enter_defaults_to_no() {
        let mut dialog = dialog();
        assert!(matches!(
            press(&mut dialog, KeyCode::Enter),
            Some(Action::ConfirmAnswer(false))
        ));
    }

    #[test]
    fn moving_to_yes_then_enter_accepts() {
        let mut dialog = dialog();
        assert!(press(&mut dialog, KeyCode::Left).is_none());
        assert!(matches!(
            press(&mut dialog, KeyCode::Enter),
            Some(Action::ConfirmAnswer(true))
        ));
    }

    #[test]
    fn escape_declines() {
        let mut dialog = dialog();
        press(&mut dialog, KeyCode::Left);
        assert!(matches!(
            press(&mut dialog, KeyCode::Esc),
            Some(Action::ConfirmAnswer(false))
        ));
    }
}
