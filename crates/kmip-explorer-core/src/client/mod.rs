// ── KMIP client interface ──
//
// The explorer talks to the key-management server exclusively through
// `KmipClient`. Calls are synchronous and may block on network I/O, so the
// controller only ever invokes them from blocking background tasks.
// Implementations must be shareable across those tasks.

pub mod sandbox;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::command::requests::{KeyPairSpec, RegisterSpec, SymmetricKeySpec};
use crate::model::{AttributeSet, ManagedObject, ObjectType, RevocationReason};

pub use sandbox::{Call, CallKind, SandboxClient};

// ── Errors ───────────────────────────────────────────────────────────

/// KMIP result reasons a server can report for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ResultReason {
    ItemNotFound,
    PermissionDenied,
    IllegalOperation,
    InvalidField,
    WrongKeyLifecycleState,
    OperationNotSupported,
    GeneralFailure,
}

/// Failure reported by a client implementation.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{reason}: {message}")]
    Operation {
        reason: ResultReason,
        message: String,
    },

    #[error("Cannot connect to {addr}: {message}")]
    Connection { addr: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    pub fn operation(reason: ResultReason, message: impl Into<String>) -> Self {
        Self::Operation {
            reason,
            message: message.into(),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::operation(ResultReason::ItemNotFound, format!("object {id} not found"))
    }
}

// ── Server identity ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// What the banner shows about the connected server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub address: String,
    pub protocol_version: ProtocolVersion,
}

/// Identifiers of a freshly created or rekeyed key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairIds {
    pub public: String,
    pub private: String,
}

// ── Trait ────────────────────────────────────────────────────────────

pub trait KmipClient: Send + Sync {
    fn server_info(&self) -> ServerInfo;

    /// Ids of all objects, optionally constrained to one object type.
    fn locate(&self, object_type: Option<ObjectType>) -> Result<Vec<String>, ClientError>;

    /// Attributes of one object. An empty `names` slice requests all of them.
    fn get_attributes(&self, id: &str, names: &[&str]) -> Result<AttributeSet, ClientError>;

    fn activate(&self, id: &str) -> Result<(), ClientError>;

    fn revoke(
        &self,
        id: &str,
        reason: RevocationReason,
        message: Option<&str>,
    ) -> Result<(), ClientError>;

    fn destroy(&self, id: &str) -> Result<(), ClientError>;

    /// Rekey a symmetric key, returning the replacement's id.
    fn rekey(&self, id: &str, offset_days: Option<u32>) -> Result<String, ClientError>;

    /// Rekey the key pair a private key belongs to.
    fn rekey_key_pair(&self, id: &str, offset_days: Option<u32>)
    -> Result<KeyPairIds, ClientError>;

    fn create(&self, spec: &SymmetricKeySpec) -> Result<String, ClientError>;

    fn create_key_pair(&self, spec: &KeyPairSpec) -> Result<KeyPairIds, ClientError>;

    fn register(&self, spec: &RegisterSpec) -> Result<String, ClientError>;

    fn get(&self, id: &str) -> Result<ManagedObject, ClientError>;
}
