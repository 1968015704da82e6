use crate::{Effect, FetchFailure, LoadState, Msg, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Announced,
    Retry,
}

/// Pure update function: applies a message to state and returns any effects.
pub fn update<Id, Data, Err>(
    mut state: LoadState<Id, Data, Err>,
    msg: Msg<Id, Data, Err>,
) -> (LoadState<Id, Data, Err>, Vec<Effect<Id>>)
where
    Id: Clone + PartialEq,
{
    let effects = match msg {
        Msg::IdentityChanged(id) => try_fetch(&mut state, id, Trigger::Announced),
        Msg::RetryRequested => {
            if !state.phase().is_error() {
                return (state, Vec::new());
            }
            let id = state.id().clone();
            try_fetch(&mut state, id, Trigger::Retry)
        }
        Msg::CancelRequested => match state.cancel_in_flight() {
            Some(ticket) => vec![Effect::AbortFetch { ticket }],
            None => Vec::new(),
        },
        Msg::PlaceholderChanged(placeholder) => {
            state.set_placeholder(placeholder);
            Vec::new()
        }
        Msg::FetchFinished { ticket, id, result } => {
            // Completions for a superseded ticket or an identity that is no longer
            // current are dropped without touching the phase.
            if !state.is_current(ticket, &id) {
                return (state, Vec::new());
            }
            match result {
                Ok(data) => state.settle(Phase::Loaded(data)),
                Err(FetchFailure::Failed(err)) => state.settle(Phase::Error(err)),
                Err(FetchFailure::Cancelled) => {
                    state.cancel_in_flight();
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn try_fetch<Id, Data, Err>(
    state: &mut LoadState<Id, Data, Err>,
    id: Id,
    trigger: Trigger,
) -> Vec<Effect<Id>>
where
    Id: Clone + PartialEq,
{
    // Skeleton composition must never cause real work.
    if state.is_placeholder() {
        return Vec::new();
    }

    if trigger == Trigger::Announced {
        let operation = state.operation();
        if operation.is_loaded_for(&id) || operation.is_failed_for(&id) {
            return Vec::new();
        }
    }

    let (ticket, superseded) = state.begin_fetch(id.clone());
    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = superseded {
        effects.push(Effect::CancelFetch { ticket: previous });
    }
    effects.push(Effect::StartFetch { ticket, id });
    effects
}
