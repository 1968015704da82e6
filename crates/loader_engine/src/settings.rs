#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Prefix for every log line emitted by this controller instance.
    pub label: String,
    /// Start in placeholder (skeleton) mode: no fetch is ever issued while set.
    pub placeholder: bool,
    /// Actively cancel a superseded fetch task. When off, the task runs to completion
    /// and its result is discarded on arrival.
    pub cancel_superseded: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            label: "load-controller".to_string(),
            placeholder: false,
            cancel_superseded: true,
        }
    }
}

impl ControllerSettings {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}
