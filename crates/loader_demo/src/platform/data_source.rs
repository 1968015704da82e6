use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use loader_engine::{FetchFailure, Fetcher};
use loader_logging::loader_debug;

/// Identity of the screen-level controller that loads the tab list.
pub const ROOT_VIEW_ID: &str = "root-view";

const SKATE: &str = "Skate";
const BIKE: &str = "Bike";
const CAR: &str = "Car";
const BOAT: &str = "Boat";
const PLANE: &str = "Plane";
const FEET: &str = "Feet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Rendered directly, no controller involved.
    Local,
    Remote,
}

/// A tab is identified by its title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tab {
    pub title: String,
}

impl Tab {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.title == FEET {
            DisplayMode::Local
        } else {
            DisplayMode::Remote
        }
    }
}

pub fn mock_tabs() -> Vec<Tab> {
    [SKATE, BIKE, CAR, BOAT, PLANE, FEET]
        .into_iter()
        .map(Tab::new)
        .collect()
}

pub const LOCAL_CONTENT: &str = "This content is local; nothing to wait for.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DemoFetchError {
    #[error("the server could not provide {0:?} right now")]
    Unavailable(String),
}

/// Fails the first attempt for every key in `flaky`, then succeeds.
#[derive(Debug, Default)]
struct FlakyGate {
    flaky: HashSet<String>,
    tripped: Mutex<HashSet<String>>,
}

impl FlakyGate {
    fn new(flaky: impl IntoIterator<Item = String>) -> Self {
        Self {
            flaky: flaky.into_iter().collect(),
            tripped: Mutex::new(HashSet::new()),
        }
    }

    fn should_fail(&self, key: &str) -> bool {
        if !self.flaky.contains(key) {
            return false;
        }
        match self.tripped.lock() {
            Ok(mut tripped) => tripped.insert(key.to_string()),
            Err(_) => false,
        }
    }
}

/// Simulated backend for the tab list.
#[derive(Debug, Clone)]
pub struct TabListSource {
    delay: Duration,
    gate: Arc<FlakyGate>,
}

impl TabListSource {
    pub fn new(delay: Duration, flaky: bool) -> Self {
        let flaky_keys = flaky.then(|| ROOT_VIEW_ID.to_string());
        Self {
            delay,
            gate: Arc::new(FlakyGate::new(flaky_keys)),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher<&'static str, Vec<Tab>, DemoFetchError> for TabListSource {
    async fn fetch(&self, id: &'static str) -> Result<Vec<Tab>, FetchFailure<DemoFetchError>> {
        tokio::time::sleep(self.delay).await;
        if self.gate.should_fail(id) {
            return Err(DemoFetchError::Unavailable("the tab list".to_string()).into());
        }
        Ok(mock_tabs())
    }
}

/// Simulated backend for per-tab text content.
#[derive(Debug, Clone)]
pub struct TabContentSource {
    delay: Duration,
    gate: Arc<FlakyGate>,
}

impl TabContentSource {
    pub fn new(delay: Duration, flaky_tabs: Vec<String>) -> Self {
        Self {
            delay,
            gate: Arc::new(FlakyGate::new(flaky_tabs)),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher<Tab, String, DemoFetchError> for TabContentSource {
    async fn fetch(&self, tab: Tab) -> Result<String, FetchFailure<DemoFetchError>> {
        loader_debug!("loading content for {}", tab.title);
        tokio::time::sleep(self.delay).await;
        if self.gate.should_fail(&tab.title) {
            return Err(DemoFetchError::Unavailable(tab.title).into());
        }
        Ok(content_for(&tab).to_string())
    }
}

fn content_for(tab: &Tab) -> &'static str {
    match tab.title.as_str() {
        SKATE => "Skateboards pair a layered maple deck with two trucks and four urethane wheels.",
        BIKE => "Bicycles are pedal-driven, single-track vehicles with two wheels in line on a frame.",
        CAR => "Cars are road vehicles that usually seat a handful of people on four wheels.",
        BOAT => "Boats are watercraft, generally smaller than ships and built in many shapes.",
        PLANE => "Planes are fixed-wing aircraft pushed forward by jet engines, propellers or rockets.",
        _ => "Don't know this one",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_feet_is_local() {
        let local: Vec<_> = mock_tabs()
            .into_iter()
            .filter(|tab| tab.display_mode() == DisplayMode::Local)
            .collect();
        assert_eq!(local, vec![Tab::new(FEET)]);
    }

    #[tokio::test(start_paused = true)]
    async fn flaky_tab_fails_once_then_recovers() {
        let source = TabContentSource::new(Duration::from_millis(5), vec![BOAT.to_string()]);

        let first = source.fetch(Tab::new(BOAT)).await;
        assert_eq!(
            first,
            Err(FetchFailure::Failed(DemoFetchError::Unavailable(
                BOAT.to_string()
            )))
        );

        let second = source.fetch(Tab::new(BOAT)).await.unwrap();
        assert!(second.starts_with("Boats"));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_tab_gets_fallback_text() {
        let source = TabContentSource::new(Duration::ZERO, Vec::new());
        let text = source.fetch(Tab::new("Rocket")).await.unwrap();
        assert_eq!(text, "Don't know this one");
    }

    #[tokio::test(start_paused = true)]
    async fn tab_list_can_fail_first() {
        let source = TabListSource::new(Duration::ZERO, true);
        assert!(source.fetch(ROOT_VIEW_ID).await.is_err());
        assert_eq!(source.fetch(ROOT_VIEW_ID).await.unwrap().len(), 6);
    }
}
