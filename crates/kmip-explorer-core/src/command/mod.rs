// ── Action protocol ──
//
// Every mutation is an `Operation` carried out by an `Effect`: a deferred
// closure built by a form (or directly, for activate/destroy) and run at
// most once by the controller on a background task. The operation decides
// whether a confirmation prompt is required and how a successful result is
// reconciled with the directory.

pub mod effect;
pub mod requests;

use strum::Display;

pub use effect::{Effect, Target};
pub use requests::{
    AesKeySize, CreateRequest, CreateSpec, KeyEncoding, KeyPairSpec, KeyTemplate, RegisterPayload,
    RegisterRequest, RegisterSpec, RekeyRequest, RevokeRequest, RsaModulus, SymmetricKeySpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    Activate,
    Revoke,
    Destroy,
    Rekey,
    Create,
    Register,
}

/// How a successful operation is folded back into the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Drop the target's row.
    Remove,
    /// Re-fetch the target's attributes and patch its row.
    Refetch,
    /// Re-run the locate query and rebuild the whole directory.
    FullRefresh,
}

impl Operation {
    /// Operations that act on the selected object rather than creating one.
    pub fn is_targeted(self) -> bool {
        !matches!(self, Self::Create | Self::Register)
    }

    pub fn needs_confirmation(self) -> bool {
        matches!(self, Self::Revoke | Self::Destroy | Self::Rekey)
    }

    pub fn reconciliation(self) -> Reconciliation {
        match self {
            Self::Destroy => Reconciliation::Remove,
            Self::Activate | Self::Revoke | Self::Rekey => Reconciliation::Refetch,
            Self::Create | Self::Register => Reconciliation::FullRefresh,
        }
    }

    /// Confirmation prompt for `id`, if this operation requires one.
    pub fn prompt(self, id: &str) -> Option<Prompt> {
        let (title, verb) = match self {
            Self::Revoke => ("Confirm Revoke", "Revoke"),
            Self::Destroy => ("Confirm Destroy", "Destroy"),
            Self::Rekey => ("Confirm Rekeying", "Rekey"),
            Self::Activate | Self::Create | Self::Register => return None,
        };
        Some(Prompt {
            title: title.to_owned(),
            question: format!("{verb} object {id} ?"),
        })
    }
}

/// A yes/no question shown before a destructive operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub question: String,
}

/// An effect bound to its target, waiting for confirmation or execution.
pub struct ActionRequest {
    pub target: Target,
    pub prompt: Option<Prompt>,
    pub effect: Effect,
}

impl ActionRequest {
    pub fn new(target: Target, effect: Effect) -> Self {
        let prompt = target
            .id
            .as_deref()
            .and_then(|id| effect.operation().prompt(id));
        Self {
            target,
            prompt,
            effect,
        }
    }

    pub fn operation(&self) -> Operation {
        self.effect.operation()
    }
}

impl std::fmt::Debug for ActionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRequest")
            .field("target", &self.target)
            .field("operation", &self.operation())
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_destructive_operations_are_confirmed() {
        let confirmed: Vec<Operation> = [
            Operation::Activate,
            Operation::Revoke,
            Operation::Destroy,
            Operation::Rekey,
            Operation::Create,
            Operation::Register,
        ]
        .into_iter()
        .filter(|op| op.needs_confirmation())
        .collect();
        assert_eq!(
            confirmed,
            vec![Operation::Revoke, Operation::Destroy, Operation::Rekey]
        );
    }

    #[test]
    fn reconciliation_per_operation() {
        assert_eq!(Operation::Destroy.reconciliation(), Reconciliation::Remove);
        assert_eq!(Operation::Rekey.reconciliation(), Reconciliation::Refetch);
        assert_eq!(Operation::Create.reconciliation(), Reconciliation::FullRefresh);
    }

    #[test]
    fn destroy_request_carries_prompt() {
        let request = ActionRequest::new(Target::object("A", None), Effect::destroy());
        let prompt = request.prompt.as_ref();
        assert_eq!(prompt.map(|p| p.title.as_str()), Some("Confirm Destroy"));
        assert_eq!(prompt.map(|p| p.question.as_str()), Some("Destroy object A ?"));

        let activate = ActionRequest::new(Target::object("A", None), Effect::activate());
        assert!(activate.prompt.is_none());
    }
}
