//! Attributes pane for the selected object.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use kmip_explorer_core::AttributeSet;

use crate::theme;

/// One line per attribute: `Name: value`, or `Name: field: value, ...` for
/// structured values.
pub fn attribute_lines(object: &AttributeSet) -> Vec<Line<'static>> {
    let value_style = Style::default().fg(theme::DIM_WHITE);
    object
        .attributes
        .iter()
        .map(|attribute| {
            let name = match attribute.index {
                Some(index) if index > 0 => format!("{} [{index}]: ", attribute.name),
                _ => format!("{}: ", attribute.name),
            };
            let mut spans = vec![Span::styled(name, theme::attribute_name())];
            for (i, part) in attribute.value.parts().into_iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(", ", value_style));
                }
                if let Some(field) = part.field {
                    spans.push(Span::styled(format!("{field}: "), theme::attribute_field()));
                }
                spans.push(Span::styled(part.text, value_style));
            }
            Line::from(spans)
        })
        .collect()
}

pub fn render_attributes(
    frame: &mut Frame,
    area: Rect,
    object: &AttributeSet,
    focused: bool,
    scroll: u16,
) {
    let block = Block::default()
        .title(" Attributes ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        });

    let paragraph = Paragraph::new(attribute_lines(object))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use kmip_explorer_core::AttributeValue;
    use kmip_explorer_core::model::{Attribute, Name, State, names};

    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn structured_values_list_their_fields() {
        let object = AttributeSet::new(
            "id-1",
            vec![
                Attribute::new(names::STATE, AttributeValue::State(State::Active)),
                Attribute::indexed(names::NAME, 1, AttributeValue::Name(Name::text("alias"))),
            ],
        );
        let lines = attribute_lines(&object);
        assert_eq!(text(&lines[0]), "State: Active");
        assert_eq!(
            text(&lines[1]),
            "Name [1]: Name Value: alias, Name Type: UninterpretedTextString"
        );
    }
}
