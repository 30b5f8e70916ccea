// ── Update queue items ──
//
// Background tasks never touch the directory. They finish by sending
// exactly one `Update`, which the UI loop applies in arrival order.

use crate::command::Operation;
use crate::error::CoreError;
use crate::model::{AttributeSet, ManagedObject};

/// Directory change produced by a successful action.
#[derive(Debug)]
pub enum Patch {
    Remove(String),
    Update(AttributeSet),
    Replace(Vec<AttributeSet>),
}

#[derive(Debug)]
pub enum Update {
    /// A full refresh completed.
    Loaded {
        objects: Vec<AttributeSet>,
        reset_selection: bool,
    },
    LoadFailed(CoreError),
    /// An action ran and its result has been fetched for reconciliation.
    Reconciled { operation: Operation, patch: Patch },
    ActionFailed {
        operation: Operation,
        error: CoreError,
    },
    /// Content fetched for the material viewer.
    Material {
        id: String,
        result: Result<ManagedObject, CoreError>,
    },
}
