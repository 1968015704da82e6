use crate::{FetchFailure, FetchTicket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<Id, Data, Err> {
    /// Host announced the identity it wants displayed. Redundant announcements
    /// (view re-appearing, re-render) are expected and safe.
    IdentityChanged(Id),
    /// User pressed retry on the error view.
    RetryRequested,
    /// Host no longer needs the in-flight fetch (view went away).
    CancelRequested,
    /// Host entered or left placeholder/skeleton presentation.
    PlaceholderChanged(bool),
    /// Fetch task completion for a previously issued ticket.
    FetchFinished {
        ticket: FetchTicket,
        id: Id,
        result: Result<Data, FetchFailure<Err>>,
    },
}
