//! Reusable widgets and modal overlays.

pub mod attributes;
pub mod banner;
pub mod confirm;
pub mod key_material;
pub mod object_table;
pub mod type_tabs;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::theme;

/// A `width` × `height` rectangle centered in `area`, clipped to it.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = (area.width - width) / 2;
    let y = (area.height - height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

/// The error modal: one message, dismissed with Enter or Esc.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str) {
    let width = 60u16.min(area.width.saturating_sub(4));
    let text_width = usize::from(width.saturating_sub(4).max(1));
    let wrapped = u16::try_from(message.chars().count().div_ceil(text_width)).unwrap_or(1);
    let dialog = centered_rect(area, width, wrapped + 5);

    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .title(" Error ")
        .title_style(theme::title_style())
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::DIM_WHITE))
        .style(Style::default().bg(theme::BG_ERROR));
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(theme::DIM_WHITE))),
        Line::from(""),
        Line::from(Span::styled(" OK ", theme::button(true, true))),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_clipped() {
        let area = Rect::new(10, 5, 40, 10);
        assert_eq!(centered_rect(area, 20, 4), Rect::new(20, 8, 20, 4));
        assert_eq!(centered_rect(area, 80, 40), area);
    }
}
