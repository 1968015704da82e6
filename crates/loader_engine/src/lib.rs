//! Loader engine: owner loop, fetch task execution, and the host-facing controller handle.
mod controller;
mod fetch;
mod settings;

pub use controller::{ControllerError, Identity, LoadController, Payload, Presentation, RetryHandle};
pub use fetch::Fetcher;
pub use loader_core::{FetchFailure, Operation, Phase, RenderOutcome};
pub use settings::ControllerSettings;
