//! Register form: import a secret, certificate or key supplied as text.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use secrecy::SecretString;
use strum::IntoEnumIterator;

use kmip_explorer_core::Effect;
use kmip_explorer_core::command::{KeyEncoding, RegisterPayload, RegisterRequest};

use super::field::{ChoiceField, Field, Form, FormInput, TextField};
use crate::action::Action;
use crate::component::Component;

const NAME: &str = "Name";
const OBJECT_TYPE: &str = "Object Type";
const SECRET_VALUE: &str = "Secret Value";
const BASE64: &str = "Base64";
const PEM: &str = "PEM";
const PEM_KEY: &str = "PEM Key";
const KEY: &str = "Key";
const FORMAT: &str = "Format";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Secret,
    Certificate,
    AesKey,
    PrivateKey,
    PublicKey,
}

impl Kind {
    const ALL: [Self; 5] = [
        Self::Secret,
        Self::Certificate,
        Self::AesKey,
        Self::PrivateKey,
        Self::PublicKey,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::Certificate => "X509 Certificate",
            Self::AesKey => "AES Key",
            Self::PrivateKey => "Private Key",
            Self::PublicKey => "Public Key",
        }
    }

    /// The field holding the value to register.
    fn value_field(self) -> &'static str {
        match self {
            Self::Secret => SECRET_VALUE,
            Self::Certificate => PEM,
            Self::AesKey => KEY,
            Self::PrivateKey | Self::PublicKey => PEM_KEY,
        }
    }
}

pub struct RegisterForm {
    form: Form,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self {
            form: Form::new(
                "Register object",
                vec![
                    Field::text(NAME, TextField::line()),
                    Field::choice(OBJECT_TYPE, ChoiceField::unset(Kind::ALL.map(Kind::label))),
                ],
            ),
        }
    }

    fn kind(&self) -> Option<Kind> {
        self.form
            .choice(OBJECT_TYPE)
            .and_then(|i| Kind::ALL.get(i).copied())
    }

    fn kind_changed(&mut self) {
        let dependent = match self.kind() {
            Some(Kind::Secret) => vec![
                Field::text(SECRET_VALUE, TextField::area(3)),
                Field::toggle(BASE64),
            ],
            Some(Kind::Certificate) => vec![Field::text(PEM, TextField::area(5))],
            Some(Kind::AesKey) => vec![
                Field::text(KEY, TextField::area(3)),
                Field::choice(FORMAT, ChoiceField::first(KeyEncoding::iter())),
            ],
            Some(Kind::PrivateKey | Kind::PublicKey) => {
                vec![Field::text(PEM_KEY, TextField::area(5))]
            }
            None => Vec::new(),
        };
        self.form.replace_tail(2, dependent);
    }

    fn submit_enabled(&self) -> bool {
        self.kind()
            .is_some_and(|kind| !self.form.text(kind.value_field()).trim().is_empty())
    }

    /// The request described by the current field values. Decoding is left
    /// to the effect.
    pub fn request(&self) -> Option<RegisterRequest> {
        if !self.submit_enabled() {
            return None;
        }
        let kind = self.kind()?;
        let value = self.form.text(kind.value_field()).to_owned();
        let payload = match kind {
            Kind::Secret => RegisterPayload::Secret {
                value: SecretString::from(value),
                base64: self.form.toggled(BASE64),
            },
            Kind::Certificate => RegisterPayload::Certificate { pem: value },
            Kind::AesKey => RegisterPayload::AesKey {
                text: value,
                encoding: KeyEncoding::iter()
                    .nth(self.form.choice(FORMAT).unwrap_or(0))
                    .unwrap_or(KeyEncoding::Hex),
            },
            Kind::PrivateKey => RegisterPayload::PrivateKey { pem: value },
            Kind::PublicKey => RegisterPayload::PublicKey { pem: value },
        };
        Some(RegisterRequest {
            name: self.form.text(NAME).to_owned(),
            payload,
        })
    }

    fn outcome(&mut self, input: FormInput) -> Option<Action> {
        match input {
            FormInput::Edited(OBJECT_TYPE) => {
                self.kind_changed();
                None
            }
            FormInput::Submit => self
                .request()
                .map(|request| Action::FormDone(Effect::register(request))),
            FormInput::Cancel => Some(Action::FormCancelled),
            FormInput::Edited(_) | FormInput::Ignored => None,
        }
    }
}

impl Component for RegisterForm {
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
        "register"
    }
}
