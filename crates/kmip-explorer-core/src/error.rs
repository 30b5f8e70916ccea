// ── Core error types ──
//
// Everything the explorer can surface to the operator. Client errors are
// wrapped unchanged; the remaining variants are raised locally before any
// request reaches the server.

use thiserror::Error;

use crate::client::ClientError;
use crate::command::Operation;
use crate::model::ObjectType;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Server / network ─────────────────────────────────────────────
    #[error(transparent)]
    Client(#[from] ClientError),

    // ── Domain errors ────────────────────────────────────────────────
    #[error("Cannot rekey a public-key. Please rekey the private-key instead.")]
    PublicKeyRekey,

    #[error("Cannot rekey an object of type {object_type}")]
    UnsupportedRekey { object_type: ObjectType },

    #[error("Undefined KMIP object type")]
    UndefinedObjectType,

    #[error("Invalid {field}: {reason}")]
    Decode { field: &'static str, reason: String },

    #[error("Cannot render {object_type} stored as {format}")]
    UnsupportedFormat {
        object_type: ObjectType,
        format: String,
    },

    #[error("No object selected")]
    NoSelection,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("No {0} action is in progress")]
    NoPendingAction(Operation),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl CoreError {
    pub(crate) fn decode(field: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            field,
            reason: reason.to_string(),
        }
    }
}
