//! Dashboard views

pub mod builder;
pub mod home;
pub mod ocr_modal;
pub mod settings;

pub use builder::render_builder_view;
pub use home::render_home_view;
pub use ocr_modal::render_ocr_modal;
pub use settings::render_settings_view;
