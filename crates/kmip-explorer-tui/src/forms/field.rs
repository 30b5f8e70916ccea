// ── Form fields ──
//
// A `Form` is a vertical list of labelled fields followed by OK and Cancel
// buttons. Focus moves with Tab / Shift+Tab or the arrow keys. Concrete
// forms react to `FormInput::Edited` to add or drop dependent fields and
// decide when OK is enabled.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tui_input::{Input, InputRequest};

use crate::theme;
use crate::widgets::centered_rect;

// ── Field kinds ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TextField {
    input: Input,
    /// Visible rows. More than one makes Enter insert a line break.
    rows: u16,
    digits_only: bool,
}

impl TextField {
    pub fn line() -> Self {
        Self {
            rows: 1,
            ..Self::default()
        }
    }

    pub fn area(rows: u16) -> Self {
        Self {
            rows: rows.max(2),
            ..Self::default()
        }
    }

    /// Only ASCII digits are accepted as they are typed.
    pub fn digits() -> Self {
        Self {
            rows: 1,
            digits_only: true,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    fn multiline(&self) -> bool {
        self.rows > 1
    }

    fn accepts(&self, c: char) -> bool {
        if self.digits_only {
            c.is_ascii_digit()
        } else {
            !c.is_control() || (c == '\n' && self.multiline())
        }
    }

    fn insert(&mut self, c: char) -> bool {
        if !self.accepts(c) {
            return false;
        }
        self.input.handle(InputRequest::InsertChar(c)).is_some()
    }

    /// Cursor column within the value.
    pub fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    /// Apply an editing key. Returns whether the value changed.
    pub fn edit(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let request = match key.code {
            KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char(c) if !ctrl => return self.insert(c),
            KeyCode::Enter if self.multiline() => return self.insert('\n'),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return false,
        };
        let before = self.input.value().len();
        self.input.handle(request);
        before != self.input.value().len()
    }

    pub fn paste(&mut self, text: &str) -> bool {
        let mut changed = false;
        for c in text.replace("\r\n", "\n").chars() {
            let c = if c == '\r' { '\n' } else { c };
            if c == '\n' && !self.multiline() {
                continue;
            }
            changed |= self.insert(c);
        }
        changed
    }
}

/// Drop-down replacement: cycles through options with Left / Right.
#[derive(Debug, Clone)]
pub struct ChoiceField {
    options: Vec<String>,
    selected: Option<usize>,
}

impl ChoiceField {
    /// Starts with nothing chosen.
    pub fn unset<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            options: options.into_iter().map(|o| o.to_string()).collect(),
            selected: None,
        }
    }

    /// Starts on the first option.
    pub fn first<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let mut field = Self::unset(options);
        field.selected = (!field.options.is_empty()).then_some(0);
        field
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    fn step(&mut self, forward: bool) -> bool {
        let len = self.options.len();
        if len == 0 {
            return false;
        }
        let next = match (self.selected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        let changed = self.selected != Some(next);
        self.selected = Some(next);
        changed
    }

    fn display(&self) -> String {
        match self.selected.and_then(|i| self.options.get(i)) {
            Some(option) => format!("◂ {option} ▸"),
            None => "◂ select ▸".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Text(TextField),
    Choice(ChoiceField),
    Toggle(bool),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub fn text(label: &'static str, field: TextField) -> Self {
        Self {
            label,
            kind: FieldKind::Text(field),
        }
    }

    pub fn choice(label: &'static str, field: ChoiceField) -> Self {
        Self {
            label,
            kind: FieldKind::Choice(field),
        }
    }

    pub fn toggle(label: &'static str) -> Self {
        Self {
            label,
            kind: FieldKind::Toggle(false),
        }
    }

    fn height(&self) -> u16 {
        match &self.kind {
            FieldKind::Text(text) => text.rows,
            FieldKind::Choice(_) | FieldKind::Toggle(_) => 1,
        }
    }
}

// ── Form ─────────────────────────────────────────────────────────────

/// Outcome of one key press on a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    /// The value of the named field changed.
    Edited(&'static str),
    Submit,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Field(usize),
    Ok,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
    title: &'static str,
    fields: Vec<Field>,
    /// Index over fields, then OK, then Cancel.
    focus: usize,
}

impl Form {
    pub fn new(title: &'static str, fields: Vec<Field>) -> Self {
        Self {
            title,
            fields,
            focus: 0,
        }
    }

    fn field(&self, label: &str) -> Option<&FieldKind> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| &f.kind)
    }

    /// Text of the named text field, empty if absent.
    pub fn text(&self, label: &str) -> &str {
        match self.field(label) {
            Some(FieldKind::Text(text)) => text.value(),
            _ => "",
        }
    }

    pub fn choice(&self, label: &str) -> Option<usize> {
        match self.field(label) {
            Some(FieldKind::Choice(choice)) => choice.selected(),
            _ => None,
        }
    }

    pub fn toggled(&self, label: &str) -> bool {
        matches!(self.field(label), Some(FieldKind::Toggle(true)))
    }

    /// Replace every field after the first `keep` ones.
    pub fn replace_tail(&mut self, keep: usize, fields: Vec<Field>) {
        self.fields.truncate(keep);
        self.fields.extend(fields);
    }

    fn focus(&self) -> Focus {
        let n = self.fields.len();
        match self.focus {
            i if i < n => Focus::Field(i),
            i if i == n => Focus::Ok,
            _ => Focus::Cancel,
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let slots = self.fields.len() + 2;
        self.focus = if forward {
            (self.focus + 1) % slots
        } else {
            (self.focus + slots - 1) % slots
        };
    }

    /// Handle a key. `submit_enabled` gates the OK button.
    pub fn handle_key(&mut self, key: KeyEvent, submit_enabled: bool) -> FormInput {
        match key.code {
            KeyCode::Esc => return FormInput::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                return FormInput::Ignored;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                return FormInput::Ignored;
            }
            _ => {}
        }

        match self.focus() {
            Focus::Ok => match key.code {
                KeyCode::Enter if submit_enabled => FormInput::Submit,
                KeyCode::Right | KeyCode::Left => {
                    self.move_focus(key.code == KeyCode::Right);
                    FormInput::Ignored
                }
                _ => FormInput::Ignored,
            },
            Focus::Cancel => match key.code {
                KeyCode::Enter => FormInput::Cancel,
                KeyCode::Left => {
                    self.move_focus(false);
                    FormInput::Ignored
                }
                _ => FormInput::Ignored,
            },
            Focus::Field(index) => self.edit_field(index, key),
        }
    }

    fn edit_field(&mut self, index: usize, key: KeyEvent) -> FormInput {
        let Some(field) = self.fields.get_mut(index) else {
            return FormInput::Ignored;
        };
        let label = field.label;
        let changed = match &mut field.kind {
            FieldKind::Text(text) => {
                if key.code == KeyCode::Enter && !text.multiline() {
                    self.move_focus(true);
                    return FormInput::Ignored;
                }
                text.edit(key)
            }
            FieldKind::Choice(choice) => match key.code {
                KeyCode::Right | KeyCode::Char(' ') => choice.step(true),
                KeyCode::Left => choice.step(false),
                KeyCode::Enter => {
                    self.move_focus(true);
                    return FormInput::Ignored;
                }
                _ => false,
            },
            FieldKind::Toggle(on) => match key.code {
                KeyCode::Char(' ') => {
                    *on = !*on;
                    true
                }
                KeyCode::Enter => {
                    self.move_focus(true);
                    return FormInput::Ignored;
                }
                _ => false,
            },
        };
        if changed {
            FormInput::Edited(label)
        } else {
            FormInput::Ignored
        }
    }

    /// Insert pasted text into the focused text field.
    pub fn paste(&mut self, text: &str) -> FormInput {
        let Focus::Field(index) = self.focus() else {
            return FormInput::Ignored;
        };
        match self.fields.get_mut(index) {
            Some(Field {
                label,
                kind: FieldKind::Text(field),
            }) => {
                if field.paste(text) {
                    FormInput::Edited(label)
                } else {
                    FormInput::Ignored
                }
            }
            _ => FormInput::Ignored,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect, submit_enabled: bool) {
        let fields_height: u16 = self.fields.iter().map(Field::height).sum();
        // borders + blank + fields + blank + buttons
        let height = fields_height + 5;
        let width = 70u16.min(area.width.saturating_sub(4));
        let panel = centered_rect(area, width, height);

        frame.render_widget(Clear, panel);
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let label_width = self
            .fields
            .iter()
            .map(|f| u16::try_from(f.label.len()).unwrap_or(u16::MAX))
            .max()
            .unwrap_or(0)
            + 2;

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(self.fields.iter().map(|f| Constraint::Length(f.height())));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        let rows = Layout::vertical(constraints).split(inner);

        let focus = self.focus();
        for (index, field) in self.fields.iter().enumerate() {
            let Some(&row) = rows.get(index + 1) else {
                break;
            };
            let focused = focus == Focus::Field(index);
            let [label_area, value_area] =
                Layout::horizontal([Constraint::Length(label_width), Constraint::Min(1)])
                    .areas(row);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {}", field.label),
                    theme::field_label(focused),
                )),
                label_area,
            );
            self.render_value(frame, value_area, field, focused);
        }

        if let Some(&buttons) = rows.last() {
            let line = Line::from(vec![
                Span::styled(" OK ", theme::button(focus == Focus::Ok, submit_enabled)),
                Span::raw("    "),
                Span::styled(" Cancel ", theme::button(focus == Focus::Cancel, true)),
            ]);
            frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), buttons);
        }
    }

    #[allow(clippy::unused_self)]
    fn render_value(&self, frame: &mut Frame, area: Rect, field: &Field, focused: bool) {
        let style = theme::field_value(focused);
        match &field.kind {
            FieldKind::Text(text) if text.multiline() => {
                let lines: Vec<&str> = text.value().split('\n').collect();
                let visible = usize::from(area.height);
                let skip = lines.len().saturating_sub(visible);
                let shown: Vec<Line> = lines
                    .iter()
                    .skip(skip)
                    .map(|l| Line::from(Span::styled((*l).to_owned(), style)))
                    .collect();
                frame.render_widget(Paragraph::new(shown).style(style), area);
                if focused {
                    let last = lines.last().map_or(0, |l| l.chars().count());
                    let row = u16::try_from(lines.len() - skip - 1).unwrap_or(0);
                    let col = u16::try_from(last).unwrap_or(u16::MAX);
                    frame.set_cursor_position(Position::new(
                        area.x + col.min(area.width.saturating_sub(1)),
                        area.y + row,
                    ));
                }
            }
            FieldKind::Text(text) => {
                let width = usize::from(area.width.max(1));
                let scroll = text.input.visual_scroll(width.saturating_sub(1));
                let shown: String = text.value().chars().skip(scroll).collect();
                frame.render_widget(Paragraph::new(Span::styled(shown, style)).style(style), area);
                if focused {
                    let col = text.input.visual_cursor().saturating_sub(scroll);
                    frame.set_cursor_position(Position::new(
                        area.x + u16::try_from(col).unwrap_or(0),
                        area.y,
                    ));
                }
            }
            FieldKind::Choice(choice) => {
                frame.render_widget(Paragraph::new(Span::styled(choice.display(), style)), area);
            }
            FieldKind::Toggle(on) => {
                let mark = if *on { "[x]" } else { "[ ]" };
                frame.render_widget(Paragraph::new(Span::styled(mark, style)), area);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    pub(crate) fn type_text(form: &mut Form, text: &str, enabled: bool) {
        for c in text.chars() {
            form.handle_key(press(KeyCode::Char(c)), enabled);
        }
    }

    fn sample() -> Form {
        Form::new(
            "Sample",
            vec![
                Field::text("Name", TextField::line()),
                Field::text("Days", TextField::digits()),
                Field::choice("Kind", ChoiceField::unset(["A", "B"])),
            ],
        )
    }

    #[test]
    fn digits_field_rejects_letters() {
        let mut form = sample();
        form.handle_key(press(KeyCode::Tab), true);
        type_text(&mut form, "1a2-3", true);
        assert_eq!(form.text("Days"), "123");
    }

    #[test]
    fn choice_cycles_from_unset() {
        let mut form = sample();
        form.handle_key(press(KeyCode::Up), true);
        form.handle_key(press(KeyCode::Up), true);
        form.handle_key(press(KeyCode::Up), true);
        assert_eq!(form.choice("Kind"), None);
        assert_eq!(
            form.handle_key(press(KeyCode::Right), true),
            FormInput::Edited("Kind")
        );
        assert_eq!(form.choice("Kind"), Some(0));
        form.handle_key(press(KeyCode::Left), true);
        form.handle_key(press(KeyCode::Left), true);
        assert_eq!(form.choice("Kind"), Some(0));
    }

    #[test]
    fn ok_respects_enabled_flag() {
        let mut form = sample();
        for _ in 0..3 {
            form.handle_key(press(KeyCode::Tab), true);
        }
        assert_eq!(form.handle_key(press(KeyCode::Enter), false), FormInput::Ignored);
        assert_eq!(form.handle_key(press(KeyCode::Enter), true), FormInput::Submit);
        form.handle_key(press(KeyCode::Tab), true);
        assert_eq!(form.handle_key(press(KeyCode::Enter), true), FormInput::Cancel);
        assert_eq!(form.handle_key(press(KeyCode::Esc), true), FormInput::Cancel);
    }

    #[test]
    fn paste_keeps_line_breaks_only_in_areas() {
        let mut form = Form::new(
            "Paste",
            vec![
                Field::text("Line", TextField::line()),
                Field::text("Area", TextField::area(3)),
            ],
        );
        form.paste("ab\ncd");
        assert_eq!(form.text("Line"), "abcd");
        form.handle_key(press(KeyCode::Tab), true);
        form.paste("-----BEGIN\r\nx\n");
        assert_eq!(form.text("Area"), "-----BEGIN\nx\n");
    }

    #[test]
    fn replace_tail_swaps_dependent_fields() {
        let mut form = sample();
        form.replace_tail(1, vec![Field::toggle("Flag")]);
        assert_eq!(form.choice("Kind"), None);
        assert!(!form.toggled("Flag"));
        form.handle_key(press(KeyCode::Tab), true);
        form.handle_key(press(KeyCode::Char(' ')), true);
        assert!(form.toggled("Flag"));
    }
}
