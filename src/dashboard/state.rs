//! Dashboard view state management

use std::collections::HashMap;
use uuid::Uuid;

use crate::assessment::NewQuestionKind;
use crate::config::StartView;
use crate::insertion::{InsertionMode, InsertionTarget};

/// Current view in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardView {
    #[default]
    Home,
    Builder,
    Settings,
}

impl DashboardView {
    pub const ALL: [DashboardView; 3] = [DashboardView::Home, DashboardView::Builder, DashboardView::Settings];

    /// Get the display name for this view
    pub fn name(&self) -> &'static str {
        match self {
            DashboardView::Home => "Home",
            DashboardView::Builder => "Builder",
            DashboardView::Settings => "Settings",
        }
    }

    /// Get the icon character for this view
    pub fn icon(&self) -> &'static str {
        match self {
            DashboardView::Home => "H",
            DashboardView::Builder => "B",
            DashboardView::Settings => "S",
        }
    }

    /// Convert to persistable setting
    pub fn to_setting(&self) -> StartView {
        match self {
            DashboardView::Home => StartView::Home,
            DashboardView::Builder => StartView::Builder,
            DashboardView::Settings => StartView::Settings,
        }
    }

    /// Convert from persistable setting
    pub fn from_setting(setting: StartView) -> Self {
        match setting {
            StartView::Home => DashboardView::Home,
            StartView::Builder => DashboardView::Builder,
            StartView::Settings => DashboardView::Settings,
        }
    }
}

/// Overall dashboard state
#[derive(Default)]
pub struct DashboardState {
    /// Current active view
    pub current_view: DashboardView,
    /// Home view state
    pub home: HomeViewState,
    /// Builder view state
    pub builder: BuilderViewState,
    /// Settings view state
    pub settings: SettingsViewState,
    /// OCR modal state
    pub capture: CaptureModalState,
}

impl DashboardState {
    pub fn new(start_view: StartView) -> Self {
        Self {
            current_view: DashboardView::from_setting(start_view),
            ..Default::default()
        }
    }
}

/// Home view state
#[derive(Debug, Default)]
pub struct HomeViewState {
    /// Test picked from the list, to be opened in the builder
    pub open_test: Option<String>,
}

/// Builder view state
#[derive(Debug)]
pub struct BuilderViewState {
    /// Test being edited
    pub selected_test: Option<String>,
    /// Kind used by the "Add question" button
    pub new_kind: NewQuestionKind,
    /// Attachment path input per question id
    pub attachment_inputs: HashMap<String, String>,
    /// Last attachment rejection per question id
    pub attachment_notices: HashMap<String, String>,
    /// Set when a field's OCR button is clicked
    pub pending_capture: Option<InsertionTarget>,
}

impl Default for BuilderViewState {
    fn default() -> Self {
        Self {
            selected_test: None,
            new_kind: NewQuestionKind::Mcq,
            attachment_inputs: HashMap::new(),
            attachment_notices: HashMap::new(),
            pending_capture: None,
        }
    }
}

/// Actions raised by the OCR modal, applied after it is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum ModalAction {
    Close,
    SubmitPath(String),
    SubmitBytes { name: String, bytes: std::sync::Arc<[u8]> },
    Discard,
    Retry,
    Commit(InsertionMode),
}

/// OCR modal state
#[derive(Default)]
pub struct CaptureModalState {
    /// "File picker" path input
    pub path_input: String,
    /// Preview texture and the image it was built from
    pub preview_texture: Option<(Uuid, egui::TextureHandle)>,
    /// Short-lived message shown under the drop zone
    pub notice: Option<String>,
}

impl CaptureModalState {
    /// Forget per-modal inputs when the modal closes
    pub fn reset(&mut self) {
        self.path_input.clear();
        self.preview_texture = None;
        self.notice = None;
    }
}

/// Settings view state
#[derive(Debug, Default)]
pub struct SettingsViewState {
    /// Currently expanded section
    pub expanded_section: Option<SettingsSection>,
    /// Whether there are unsaved changes
    pub has_unsaved_changes: bool,
    /// OCR settings changed and the engine must be rebuilt
    pub engine_dirty: bool,
}

/// Settings sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    General,
    Ocr,
    Attachments,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_setting_mapping() {
        for view in DashboardView::ALL {
            assert_eq!(DashboardView::from_setting(view.to_setting()), view);
        }
    }

    #[test]
    fn test_state_starts_on_configured_view() {
        let state = DashboardState::new(StartView::Builder);
        assert_eq!(state.current_view, DashboardView::Builder);
        assert!(state.builder.pending_capture.is_none());
    }
}
