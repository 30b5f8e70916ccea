//! Create-key form: name, key type and the size or curve for that type.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use strum::IntoEnumIterator;

use kmip_explorer_core::Effect;
use kmip_explorer_core::command::{AesKeySize, CreateRequest, KeyTemplate, RsaModulus};
use kmip_explorer_core::model::RecommendedCurve;

use super::field::{ChoiceField, Field, Form, FormInput, TextField};
use crate::action::Action;
use crate::component::Component;

const NAME: &str = "Name";
const KEY_TYPE: &str = "Key Type";
const KEY_SIZE: &str = "Key Size";
const MODULUS_SIZE: &str = "Modulus Size";
const CURVE_TYPE: &str = "Curve Type";

const KEY_TYPES: [&str; 3] = ["AES", "RSA", "EC"];

pub struct CreateKeyForm {
    form: Form,
}

impl CreateKeyForm {
    pub fn new() -> Self {
        Self {
            form: Form::new(
                "Create object",
                vec![
                    Field::text(NAME, TextField::line()),
                    Field::choice(KEY_TYPE, ChoiceField::unset(KEY_TYPES)),
                ],
            ),
        }
    }

    fn key_type_changed(&mut self) {
        let dependent = match self.form.choice(KEY_TYPE) {
            Some(0) => vec![Field::choice(
                KEY_SIZE,
                ChoiceField::first(AesKeySize::iter()),
            )],
            Some(1) => vec![Field::choice(
                MODULUS_SIZE,
                ChoiceField::first(RsaModulus::iter()),
            )],
            Some(2) => vec![Field::choice(
                CURVE_TYPE,
                ChoiceField::first(RecommendedCurve::iter()),
            )],
            _ => Vec::new(),
        };
        self.form.replace_tail(2, dependent);
    }

    fn submit_enabled(&self) -> bool {
        self.form.choice(KEY_TYPE).is_some()
    }

    /// The request described by the current field values.
    pub fn request(&self) -> Option<CreateRequest> {
        let nth = |label: &str| self.form.choice(label).unwrap_or(0);
        let template = match self.form.choice(KEY_TYPE)? {
            0 => KeyTemplate::Aes(AesKeySize::iter().nth(nth(KEY_SIZE))?),
            1 => KeyTemplate::Rsa(RsaModulus::iter().nth(nth(MODULUS_SIZE))?),
            2 => KeyTemplate::Ec(RecommendedCurve::iter().nth(nth(CURVE_TYPE))?),
            _ => return None,
        };
        Some(CreateRequest {
            name: self.form.text(NAME).to_owned(),
            template,
        })
    }

    fn outcome(&mut self, input: FormInput) -> Option<Action> {
        match input {
            FormInput::Edited(KEY_TYPE) => {
                self.key_type_changed();
                None
            }
            FormInput::Submit => self
                .request()
                .map(|request| Action::FormDone(Effect::create(request))),
            FormInput::Cancel => Some(Action::FormCancelled),
            FormInput::Edited(_) | FormInput::Ignored => None,
        }
    }
}

impl Component for CreateKeyForm {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let input = self.form.handle_key(key, self.submit_enabled());
        Ok(self.outcome(input))
    }

    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        let input = self.form.paste(text);
        Ok(self.outcome(input))
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        self.form.render(frame, area, self.submit_enabled());
    }

    fn id(&self) -> &'static str {
        "create-key"
    }
}
