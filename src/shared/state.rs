//! Shared application state between the dashboard and the workbench

use std::path::PathBuf;

use crate::assessment::AssessmentState;
use crate::config::AppConfig;

/// Central state shared by the views and the capture workbench
#[derive(Debug, Clone, Default)]
pub struct SharedAppState {
    /// Application configuration
    pub config: AppConfig,
    /// Where `config` is saved, if a config directory was available
    pub config_path: Option<PathBuf>,
    /// Current snapshot of tests and questions
    pub assessment: AssessmentState,
    /// Runtime state (not persisted)
    pub runtime: RuntimeState,
}

impl SharedAppState {
    /// Create a new shared state with the given configuration
    pub fn new(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        let assessment = if config.general.load_sample_data {
            AssessmentState::with_sample_data()
        } else {
            AssessmentState::default()
        };

        Self {
            config,
            config_path,
            assessment,
            runtime: RuntimeState::default(),
        }
    }

    /// Replace the assessment snapshot
    pub fn commit_assessment(&mut self, next: AssessmentState) {
        self.assessment = next;
    }
}

/// Outcome of the most recent recognition job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastRecognition {
    Succeeded,
    Failed,
    Cancelled,
}

/// Runtime state that is not persisted
#[derive(Debug, Clone, Default)]
pub struct RuntimeState {
    /// Last error message (if any)
    pub last_error: Option<String>,
    /// Last informational message (if any)
    pub last_notice: Option<String>,
    /// Recognition jobs started this session
    pub jobs_started: u32,
    /// Outcome of the latest finished job
    pub last_recognition: Option<LastRecognition>,
    /// Committed OCR insertions this session
    pub insertions: u32,
}

impl RuntimeState {
    /// Clear any error state
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Set an error message
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.last_notice = Some(notice.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_follows_config() {
        let state = SharedAppState::new(AppConfig::default(), None);
        assert_eq!(state.assessment.summary().tests, 2);

        let mut config = AppConfig::default();
        config.general.load_sample_data = false;
        let empty = SharedAppState::new(config, None);
        assert!(empty.assessment.tests().is_empty());
    }

    #[test]
    fn test_error_helpers() {
        let mut runtime = RuntimeState::default();
        runtime.set_error("boom");
        assert_eq!(runtime.last_error.as_deref(), Some("boom"));
        runtime.clear_error();
        assert!(runtime.last_error.is_none());
    }
}
