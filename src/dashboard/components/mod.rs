//! Reusable UI components for the dashboard

pub mod sidebar;
pub mod status_card;

pub use sidebar::{render_sidebar, SidebarStatus};
pub use status_card::{CardStatus, StatusCard};
