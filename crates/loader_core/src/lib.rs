//! Loader core: pure identity-keyed load state machine and its render projection.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, FetchFailure};
pub use msg::Msg;
pub use state::{FetchTicket, LoadState, Operation, Phase};
pub use update::update;
pub use view_model::RenderOutcome;
