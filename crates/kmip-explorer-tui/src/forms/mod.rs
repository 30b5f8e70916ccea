//! Parameter forms for the object actions.
//!
//! Each form hands back an [`Effect`](kmip_explorer_core::Effect) through
//! `Action::FormDone` and never touches the client itself.

pub mod create_key;
pub mod field;
pub mod register;
pub mod rekey;
pub mod revoke;

pub use create_key::CreateKeyForm;
pub use register::RegisterForm;
pub use rekey::RekeyForm;
pub use revoke::RevokeForm;
