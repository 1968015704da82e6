use loader_core::{update, LoadState, Msg};

type State = LoadState<&'static str, String, String>;

#[test]
fn retry_outside_error_phase_is_noop() {
    let state = State::new("A");
    let (next, effects) = update(state.clone(), Msg::RetryRequested);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn cancel_without_in_flight_fetch_is_noop() {
    let state = State::new("A");
    let (next, effects) = update(state.clone(), Msg::CancelRequested);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
