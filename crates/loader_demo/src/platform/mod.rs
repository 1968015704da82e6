//! Terminal host for the load controller: tab bar, content pane and error view.
mod app;
mod data_source;
pub mod logging;
mod render;
pub mod settings;

pub use app::run_app;
