use crate::FetchTicket;

/// Work the host runtime must perform after an [`update`](crate::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<Id> {
    /// Invoke the fetch capability for `id`; report back with the same ticket.
    StartFetch { ticket: FetchTicket, id: Id },
    /// A newer fetch replaced this one. Its result will be ignored either way.
    CancelFetch { ticket: FetchTicket },
    /// The host asked for the fetch to stop. Always stops the task.
    AbortFetch { ticket: FetchTicket },
}

/// Failure outcome of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchFailure<E> {
    /// The fetch no longer matters. Never surfaced to the user.
    #[error("fetch cancelled")]
    Cancelled,
    #[error("{0}")]
    Failed(E),
}

impl<E> FetchFailure<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchFailure::Cancelled)
    }
}

impl<E> From<E> for FetchFailure<E> {
    fn from(err: E) -> Self {
        FetchFailure::Failed(err)
    }
}
