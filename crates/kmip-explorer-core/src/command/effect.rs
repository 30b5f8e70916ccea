// ── Effects ──
//
// An `Effect` is a one-shot closure over the client. Forms build them from
// their collected input and hand them to the controller without running
// them; the controller decides whether they run at all.

use tracing::debug;

use super::Operation;
use super::requests::{CreateRequest, CreateSpec, RegisterRequest, RekeyRequest, RevokeRequest};
use crate::client::KmipClient;
use crate::error::CoreError;
use crate::model::{ObjectType, names};

type EffectFn = Box<dyn FnOnce(&dyn KmipClient, &Target) -> Result<(), CoreError> + Send>;

/// The object an effect applies to. Create and register have no target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub id: Option<String>,
    /// Object type as currently known to the directory.
    pub object_type: Option<ObjectType>,
}

impl Target {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn object(id: impl Into<String>, object_type: Option<ObjectType>) -> Self {
        Self {
            id: Some(id.into()),
            object_type,
        }
    }

    pub fn require_id(&self) -> Result<&str, CoreError> {
        self.id.as_deref().ok_or(CoreError::NoSelection)
    }
}

pub struct Effect {
    operation: Operation,
    run: EffectFn,
}

impl Effect {
    pub fn new<F>(operation: Operation, run: F) -> Self
    where
        F: FnOnce(&dyn KmipClient, &Target) -> Result<(), CoreError> + Send + 'static,
    {
        Self {
            operation,
            run: Box::new(run),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Consume the effect, performing its client calls.
    pub fn run(self, client: &dyn KmipClient, target: &Target) -> Result<(), CoreError> {
        debug!(operation = %self.operation, id = ?target.id, "running effect");
        (self.run)(client, target)
    }

    // ── Constructors ─────────────────────────────────────────────────

    pub fn activate() -> Self {
        Self::new(Operation::Activate, |client, target| {
            Ok(client.activate(target.require_id()?)?)
        })
    }

    pub fn destroy() -> Self {
        Self::new(Operation::Destroy, |client, target| {
            Ok(client.destroy(target.require_id()?)?)
        })
    }

    pub fn revoke(request: RevokeRequest) -> Self {
        Self::new(Operation::Revoke, move |client, target| {
            Ok(client.revoke(
                target.require_id()?,
                request.reason,
                request.message.as_deref(),
            )?)
        })
    }

    /// Rekey dispatches on the target's type. Public keys and unsupported
    /// types fail before any request is sent.
    pub fn rekey(request: RekeyRequest) -> Self {
        Self::new(Operation::Rekey, move |client, target| {
            let id = target.require_id()?;
            let object_type = match target.object_type {
                Some(t) => t,
                None => client
                    .get_attributes(id, &[names::OBJECT_TYPE])?
                    .object_type()
                    .ok_or(CoreError::UndefinedObjectType)?,
            };
            match object_type {
                ObjectType::SymmetricKey => {
                    let replacement = client.rekey(id, request.offset_days)?;
                    debug!(id, replacement, "symmetric key rekeyed");
                }
                ObjectType::PrivateKey => {
                    let pair = client.rekey_key_pair(id, request.offset_days)?;
                    debug!(id, private = pair.private, public = pair.public, "key pair rekeyed");
                }
                ObjectType::PublicKey => return Err(CoreError::PublicKeyRekey),
                other => return Err(CoreError::UnsupportedRekey { object_type: other }),
            }
            Ok(())
        })
    }

    pub fn create(request: CreateRequest) -> Self {
        Self::new(Operation::Create, move |client, _| {
            match request.into_spec() {
                CreateSpec::Symmetric(spec) => {
                    let id = client.create(&spec)?;
                    debug!(id, "symmetric key created");
                }
                CreateSpec::KeyPair(spec) => {
                    let pair = client.create_key_pair(&spec)?;
                    debug!(private = pair.private, public = pair.public, "key pair created");
                }
            }
            Ok(())
        })
    }

    pub fn register(request: RegisterRequest) -> Self {
        Self::new(Operation::Register, move |client, _| {
            let spec = request.into_spec()?;
            let id = client.register(&spec)?;
            debug!(id, "object registered");
            Ok(())
        })
    }
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Effect")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}
