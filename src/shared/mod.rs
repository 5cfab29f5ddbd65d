//! Shared state between the dashboard views and the capture workbench
//!
//! The state lives behind `Arc<RwLock<_>>` so the headless mode and the
//! dashboard can share the same workbench code.

pub mod state;

pub use state::{LastRecognition, RuntimeState, SharedAppState};
