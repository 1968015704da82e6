use crate::Phase;

/// What the host should draw for a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome<Data, Err> {
    /// Covers both `Idle` and `Loading`.
    Loading,
    Content(Data),
    /// Error view; the host pairs it with a retry affordance.
    Failed(Err),
}

impl<Data, Err> Phase<Data, Err> {
    pub fn outcome(&self) -> RenderOutcome<&Data, &Err> {
        match self {
            Phase::Idle | Phase::Loading => RenderOutcome::Loading,
            Phase::Loaded(data) => RenderOutcome::Content(data),
            Phase::Error(err) => RenderOutcome::Failed(err),
        }
    }
}
