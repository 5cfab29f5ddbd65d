//! Dashboard UI Module
//!
//! Native window for browsing tests, editing questions and capturing text
//! into question fields through the OCR modal.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;
pub mod views;

pub use app::DashboardApp;
pub use state::{DashboardState, DashboardView};
