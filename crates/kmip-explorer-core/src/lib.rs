//! Object directory and action protocol for browsing a KMIP key server.
//!
//! This crate owns everything below the terminal UI:
//!
//! - **[`ExplorerController`]** — composes the directory, the type filter
//!   and the action protocol. Client calls run on blocking background
//!   tasks; their results come back as [`Update`]s that the UI loop applies
//!   in order with [`ExplorerController::apply`].
//!
//! - **[`Directory`]** — the listed objects in server order, their derived
//!   table rows, search narrowing and selection. Mutations queue
//!   [`DirectoryEvent`]s for the view.
//!
//! - **[`TypeFilter`]** — cyclic selector over object categories.
//!
//! - **[`Effect`]** — one-shot closures built by forms and run at most once
//!   by the controller, after confirmation for destructive operations.
//!
//! - **[`KmipClient`]** — the server interface, with [`SandboxClient`] as an
//!   in-memory implementation.

pub mod client;
pub mod codec;
pub mod command;
pub mod error;
pub mod explorer;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{ClientError, KmipClient, SandboxClient, ServerInfo};
pub use command::{ActionRequest, Effect, Operation, Prompt, Target};
pub use error::CoreError;
pub use explorer::{ExplorerConfig, ExplorerController, ExplorerEvent, ExplorerState, Update};
pub use model::{AttributeSet, AttributeValue, ManagedObject, ObjectType, State};
pub use store::{Category, Directory, DirectoryEvent, DirectoryRow, RowStyle, TypeFilter};
