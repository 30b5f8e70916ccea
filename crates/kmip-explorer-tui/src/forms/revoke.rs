use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use strum::IntoEnumIterator;

use kmip_explorer_core::Effect;
use kmip_explorer_core::command::RevokeRequest;
use kmip_explorer_core::model::RevocationReason;

use super::field::{ChoiceField, Field, Form, FormInput, TextField};
use crate::action::Action;
use crate::component::Component;

const REASON: &str = "Reason";
const MESSAGE: &str = "Message";

pub struct RevokeForm {
    form: Form,
}

impl RevokeForm {
    pub fn new() -> Self {
        Self {
            form: Form::new(
                "Revoke an object",
                vec![
                    Field::choice(
                        REASON,
                        ChoiceField::first(RevocationReason::iter().map(RevocationReason::label)),
                    ),
                    Field::text(MESSAGE, TextField::line()),
                ],
            ),
        }
    }

    pub fn request(&self) -> RevokeRequest {
        let reason = RevocationReason::iter()
            .nth(self.form.choice(REASON).unwrap_or(0))
            .unwrap_or(RevocationReason::Unspecified);
        RevokeRequest::new(reason, self.form.text(MESSAGE))
    }
}

impl Component for RevokeForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match self.form.handle_key(key, true) {
            FormInput::Submit => Some(Action::FormDone(Effect::revoke(self.request()))),
            FormInput::Cancel => Some(Action::FormCancelled),
            FormInput::Edited(_) | FormInput::Ignored => None,
        })
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        self.form.paste(text);
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.form.render(frame, area, true);
    }

    fn id(&self) -> &'static str {
        "revoke"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::forms::field::tests::{press, type_text};

    #[test]
    fn defaults_to_unspecified_without_message() {
        let form = RevokeForm::new();
        assert_eq!(
            form.request(),
            RevokeRequest {
                reason: RevocationReason::Unspecified,
                message: None,
            }
        );
    }

    #[test]
    fn key_compromise_with_message() {
        let mut form = RevokeForm::new();
        form.handle_key_event(press(KeyCode::Right)).unwrap();
        form.handle_key_event(press(KeyCode::Tab)).unwrap();
        type_text(&mut form.form, "leaked in logs", true);

        let request = form.request();
        assert_eq!(request.reason, RevocationReason::KeyCompromise);
        assert_eq!(request.message.as_deref(), Some("leaked in logs"));
    }
}
