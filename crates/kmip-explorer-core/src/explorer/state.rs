use strum::Display;

/// Coarse controller state, derived from what is pending or in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ExplorerState {
    Idle,
    /// A refresh, re-fetch or content fetch is running.
    Loading,
    /// An action is being solicited, awaits confirmation, or is running.
    ActionPending,
    /// An error is displayed until acknowledged.
    ErrorShown,
}
