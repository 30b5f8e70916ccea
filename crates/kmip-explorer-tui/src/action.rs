//! Actions and notifications dispatched through the app loop.

use std::time::{Duration, Instant};

use kmip_explorer_core::{Effect, Operation};

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast shown in the bottom-right corner until it expires.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration: Duration::from_secs(3),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info)
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Every state transition in the TUI is expressed as an Action.
///
/// Not `Clone`: a submitted form hands over its [`Effect`], which runs at
/// most once.
#[derive(Debug)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Type filter ───────────────────────────────────────────────
    NextFilter,
    PrevFilter,
    Refresh,

    // ── Table navigation ──────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,
    ClearSelection,

    // ── Search ────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    SearchSubmit,

    // ── Attributes pane ───────────────────────────────────────────
    BrowseAttributes,
    CloseAttributes,
    ScrollAttributes(i16),

    // ── Object actions ────────────────────────────────────────────
    /// Open the parameter form for `Create`, `Register`, `Revoke` or `Rekey`.
    OpenForm(Operation),
    Activate,
    Destroy,
    GetContent,
    FormDone(Effect),
    FormCancelled,

    // ── Modals ────────────────────────────────────────────────────
    ConfirmAnswer(bool),
    AcknowledgeError,
    CloseMaterial,
    CopyToClipboard(String),

    // ── Notifications ─────────────────────────────────────────────
    UpdateAvailable(String),
}
