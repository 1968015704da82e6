/// Monotonic tag attached to every fetch the state machine issues.
pub type FetchTicket = u64;

/// Externally observable phase of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase<Data, Err> {
    /// No fetch has been issued yet.
    #[default]
    Idle,
    /// A fetch is in flight for the operation's identity, or was cancelled and awaits
    /// the next announcement.
    Loading,
    Loaded(Data),
    Error(Err),
}

impl<Data, Err> Phase<Data, Err> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Phase::Loaded(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Phase::Error(_))
    }
}

/// The identity a phase applies to. A phase is never meaningful on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<Id, Data, Err> {
    pub id: Id,
    pub phase: Phase<Data, Err>,
}

impl<Id: PartialEq, Data, Err> Operation<Id, Data, Err> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            phase: Phase::Idle,
        }
    }

    pub fn is_loaded_for(&self, id: &Id) -> bool {
        self.id == *id && self.phase.is_loaded()
    }

    /// `Phase::Error` only ever holds domain failures; cancellation is never recorded.
    pub fn is_failed_for(&self, id: &Id) -> bool {
        self.id == *id && self.phase.is_error()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadState<Id, Data, Err> {
    operation: Operation<Id, Data, Err>,
    placeholder: bool,
    in_flight: Option<FetchTicket>,
    next_ticket: FetchTicket,
    dirty: bool,
}

impl<Id, Data, Err> LoadState<Id, Data, Err>
where
    Id: Clone + PartialEq,
{
    pub fn new(initial_id: Id) -> Self {
        Self {
            operation: Operation::new(initial_id),
            placeholder: false,
            in_flight: None,
            next_ticket: 1,
            dirty: false,
        }
    }

    /// Starts in placeholder mode: the state machine never requests a fetch while set.
    pub fn with_placeholder(mut self, placeholder: bool) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn operation(&self) -> &Operation<Id, Data, Err> {
        &self.operation
    }

    pub fn phase(&self) -> &Phase<Data, Err> {
        &self.operation.phase
    }

    pub fn id(&self) -> &Id {
        &self.operation.id
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// Returns whether the state changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: bool) {
        if self.placeholder != placeholder {
            self.placeholder = placeholder;
            self.mark_dirty();
        }
    }

    /// Moves to `Loading` for `id` and returns the ticket of the new fetch together with
    /// the ticket it superseded, if any.
    pub(crate) fn begin_fetch(&mut self, id: Id) -> (FetchTicket, Option<FetchTicket>) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let superseded = self.in_flight.replace(ticket);
        self.operation.id = id;
        self.operation.phase = Phase::Loading;
        self.mark_dirty();
        (ticket, superseded)
    }

    /// A completion is current only if it carries the ticket of the in-flight request
    /// and the identity it was issued for is still the operation's identity.
    pub(crate) fn is_current(&self, ticket: FetchTicket, id: &Id) -> bool {
        self.in_flight == Some(ticket) && self.operation.id == *id
    }

    /// Forgets the in-flight request without leaving `Loading`, so the next
    /// announcement of the same identity fetches again.
    pub(crate) fn cancel_in_flight(&mut self) -> Option<FetchTicket> {
        let ticket = self.in_flight.take();
        if ticket.is_some() {
            self.mark_dirty();
        }
        ticket
    }

    pub(crate) fn settle(&mut self, phase: Phase<Data, Err>) {
        self.in_flight = None;
        self.operation.phase = phase;
        self.mark_dirty();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
