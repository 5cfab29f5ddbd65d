//! Home view - Assessment overview

use egui::RichText;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::dashboard::components::{CardStatus, StatusCard};
use crate::dashboard::state::HomeViewState;
use crate::dashboard::theme::{self, ThemeColors};
use crate::shared::{LastRecognition, SharedAppState};

/// Render the home view
pub fn render_home_view(
    ui: &mut egui::Ui,
    state: &mut HomeViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
    engine_name: &str,
) {
    let app_state = shared_state.read();
    let summary = app_state.assessment.summary();

    ui.heading(RichText::new("Dashboard").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Tests in this session and the OCR capture status")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );

    ui.add_space(24.0);

    ui.horizontal_wrapped(|ui| {
        let tests_status = if summary.tests > 0 { CardStatus::Ok } else { CardStatus::Idle };
        StatusCard::new("Tests", summary.tests.to_string(), tests_status)
            .with_caption(format!("{} marks total", summary.total_marks))
            .show(ui);

        ui.add_space(16.0);

        StatusCard::new("Questions", summary.questions.to_string(), tests_status)
            .with_caption(format!(
                "{} MCQ / {} matching / {} subjective",
                summary.mcq, summary.matching, summary.subjective
            ))
            .show(ui);

        ui.add_space(16.0);

        StatusCard::new("OCR Engine", engine_name, CardStatus::Ok)
            .with_caption(app_state.config.ocr.language.clone())
            .show(ui);

        ui.add_space(16.0);

        let last = app_state.runtime.last_recognition;
        let last_value = match last {
            Some(LastRecognition::Succeeded) => "Succeeded",
            Some(LastRecognition::Failed) => "Failed",
            Some(LastRecognition::Cancelled) => "Cancelled",
            None => "None yet",
        };
        StatusCard::new("Last Recognition", last_value, CardStatus::from_recognition(last))
            .with_caption(format!(
                "{} jobs, {} inserted",
                app_state.runtime.jobs_started, app_state.runtime.insertions
            ))
            .show(ui);
    });

    ui.add_space(32.0);
    ui.heading(RichText::new("Tests").size(18.0));
    ui.add_space(12.0);

    if app_state.assessment.tests().is_empty() {
        ui.label(RichText::new("No tests loaded").color(ThemeColors::TEXT_MUTED));
    }

    egui::Grid::new("test_list")
        .num_columns(4)
        .spacing([40.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            for test in app_state.assessment.tests() {
                ui.label(RichText::new(&test.title).strong());
                ui.label(RichText::new(&test.subject).color(ThemeColors::TEXT_SECONDARY));
                ui.label(format!(
                    "{} questions, {} min",
                    test.questions.len(),
                    test.duration_minutes
                ));
                if ui.button("Edit").clicked() {
                    state.open_test = Some(test.id.clone());
                }
                ui.end_row();
            }
        });

    if let Some(notice) = &app_state.runtime.last_notice {
        ui.add_space(24.0);
        theme::banner(ui, ThemeColors::ACCENT_SUCCESS, "Done:", notice);
    }
    if let Some(error) = &app_state.runtime.last_error {
        ui.add_space(12.0);
        theme::banner(ui, ThemeColors::ACCENT_ERROR, "Error:", error);
    }
}
