//! Object-type tab bar.

use ratatui::text::{Line, Span};

use kmip_explorer_core::Category;

use crate::theme;

/// One line with every category caption, the active one bracketed.
pub fn render_type_tabs(active: Category) -> Line<'static> {
    let mut spans = Vec::with_capacity(Category::ALL.len() * 2);

    for (i, category) in Category::ALL.iter().enumerate() {
        spans.push(Span::styled(if i == 0 { " " } else { "  " }, theme::key_hint()));
        if *category == active {
            spans.push(Span::styled(
                format!("[{}]", category.caption()),
                theme::tab_active(),
            ));
        } else {
            spans.push(Span::styled(category.caption(), theme::tab_inactive()));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_caption_is_bracketed() {
        let line = render_type_tabs(Category::Secret);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("[Secrets]"));
        assert!(text.starts_with(" All  Symmetric Keys"));
        assert!(!text.contains("[All]"));
    }
}
