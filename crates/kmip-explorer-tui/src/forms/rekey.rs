use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use kmip_explorer_core::Effect;
use kmip_explorer_core::command::RekeyRequest;

use super::field::{Field, Form, FormInput, TextField};
use crate::action::Action;
use crate::component::Component;

const OFFSET_DAYS: &str = "Offset days";

pub struct RekeyForm {
    form: Form,
}

impl RekeyForm {
    pub fn new() -> Self {
        Self {
            form: Form::new(
                "Rekey",
                vec![Field::text(OFFSET_DAYS, TextField::digits())],
            ),
        }
    }

    /// `None` while the offset does not fit in a day count.
    pub fn request(&self) -> Option<RekeyRequest> {
        let text = self.form.text(OFFSET_DAYS);
        let offset_days = if text.is_empty() {
            None
        } else {
            Some(text.parse().ok()?)
        };
        Some(RekeyRequest { offset_days })
    }
}

impl Component for RekeyForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let enabled = self.request().is_some();
        Ok(match self.form.handle_key(key, enabled) {
            FormInput::Submit => self
                .request()
                .map(|request| Action::FormDone(Effect::rekey(request))),
            FormInput::Cancel => Some(Action::FormCancelled),
            FormInput::Edited(_) | FormInput::Ignored => None,
        })
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        self.form.paste(text);
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.form.render(frame, area, self.request().is_some());
    }

    fn id(&self) -> &'static str {
        "rekey"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::forms::field::tests::type_text;

    #[test]
    fn empty_offset_means_none() {
        assert_eq!(
            RekeyForm::new().request(),
            Some(RekeyRequest { offset_days: None })
        );
    }

    #[test]
    fn only_digits_are_typed() {
        let mut form = RekeyForm::new();
        type_text(&mut form.form, "-3x0", true);
        assert_eq!(form.request(), Some(RekeyRequest { offset_days: Some(30) }));
    }

    #[test]
    fn overflowing_offset_disables_ok() {
        let mut form = RekeyForm::new();
        type_text(&mut form.form, "99999999999", true);
        assert_eq!(form.request(), None);
    }
}
