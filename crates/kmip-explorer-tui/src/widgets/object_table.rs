//! Directory table: one row per listed object, colored by state.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
};

use kmip_explorer_core::Directory;

use crate::theme;

const HEADERS: [&str; 7] = ["ID", "Type", "Name", "Algorithm", "Size", "State", "Age"];

/// Render `directory` under `title`. Returns the number of body rows that
/// fit, for paging.
pub fn render_object_table(
    frame: &mut Frame,
    area: Rect,
    directory: &Directory,
    label: &str,
    focused: bool,
    state: &mut TableState,
) -> usize {
    let block = Block::default()
        .title(format!(" {} ", directory.title(label)))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        });

    let header = Row::new(
        HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(theme::table_header())),
    );

    let rows: Vec<Row> = directory
        .rows()
        .map(|row| {
            Row::new(vec![
                Cell::from(row.id.clone()),
                Cell::from(row.object_type.clone()),
                Cell::from(row.name.clone()),
                Cell::from(row.algorithm.clone()),
                Cell::from(row.size.clone()),
                Cell::from(row.state.clone()),
                Cell::from(row.age.clone()),
            ])
            .style(theme::row_style(row.style))
        })
        .collect();

    let widths = [
        Constraint::Length(36),
        Constraint::Length(14),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(22),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(theme::table_selected())
        .highlight_symbol("▸");

    // Directory rows are 1-based with 0 meaning no selection.
    state.select(directory.selected().checked_sub(1));
    let page = usize::from(area.height.saturating_sub(3));
    frame.render_stateful_widget(table, area, state);
    page.max(1)
}
