/// The externally visible state of a promise.
/// Terminal once it leaves `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromiseState {
    /// No outcome yet.
    #[default]
    Pending,

    /// The producer deposited a value.
    Resolved,

    /// The producer deposited a failure cause.
    Failed,

    /// The promise was cancelled by either side.
    Cancelled,
}

impl PromiseState {
    /// True once an outcome has been deposited.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}
