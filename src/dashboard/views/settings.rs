//! Settings view - Application configuration

use egui::RichText;
use parking_lot::RwLock;
use std::cell::Cell;
use std::sync::Arc;

use crate::config::{AppConfig, OcrBackend, StartView};
use crate::dashboard::state::{DashboardView, SettingsSection, SettingsViewState};
use crate::dashboard::theme::{self, ThemeColors};
use crate::shared::SharedAppState;

/// Collapsible section header. Returns true while expanded.
fn section_header(ui: &mut egui::Ui, view_state: &mut SettingsViewState, section: SettingsSection, title: &str) -> bool {
    let is_expanded = view_state.expanded_section == Some(section);
    let header_response = ui
        .horizontal(|ui| {
            let arrow = if is_expanded { "v" } else { ">" };
            ui.label(RichText::new(arrow).size(12.0).color(ThemeColors::TEXT_MUTED));
            ui.add_space(8.0);
            ui.heading(RichText::new(title).size(16.0));
        })
        .response;

    if header_response.interact(egui::Sense::click()).clicked() {
        view_state.expanded_section = if is_expanded { None } else { Some(section) };
    }

    if is_expanded {
        ui.add_space(16.0);
        ui.separator();
        ui.add_space(12.0);
    }
    is_expanded
}

/// Render the settings view
pub fn render_settings_view(
    ui: &mut egui::Ui,
    view_state: &mut SettingsViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
) {
    ui.heading(RichText::new("Settings").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("OCR engine, capture behaviour and attachment limits")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );

    ui.add_space(24.0);

    // Track changes using Cell to avoid borrow issues
    let changed = Cell::new(false);
    let engine_changed = Cell::new(false);

    egui::ScrollArea::vertical().show(ui, |ui| {
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            if section_header(ui, view_state, SettingsSection::General, "General") {
                let mut state = shared_state.write();

                ui.horizontal(|ui| {
                    ui.label("Load sample tests at startup:");
                    ui.add_space(8.0);
                    if ui.checkbox(&mut state.config.general.load_sample_data, "").changed() {
                        changed.set(true);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Start view:");
                    ui.add_space(8.0);
                    let current = DashboardView::from_setting(state.config.general.start_view);
                    egui::ComboBox::from_id_salt("start_view")
                        .selected_text(current.name())
                        .show_ui(ui, |ui| {
                            for view in DashboardView::ALL {
                                let setting: StartView = view.to_setting();
                                if ui
                                    .selectable_value(&mut state.config.general.start_view, setting, view.name())
                                    .changed()
                                {
                                    changed.set(true);
                                }
                            }
                        });
                });
            }
        });

        ui.add_space(16.0);

        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            if section_header(ui, view_state, SettingsSection::Ocr, "OCR") {
                let mut state = shared_state.write();
                let ocr = &mut state.config.ocr;

                ui.horizontal(|ui| {
                    ui.label("Backend:");
                    ui.add_space(8.0);
                    for backend in [OcrBackend::Tesseract, OcrBackend::Demo] {
                        if ui.radio_value(&mut ocr.backend, backend, backend.name()).changed() {
                            engine_changed.set(true);
                        }
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Language:");
                    ui.add_space(8.0);
                    if ui.add(egui::TextEdit::singleline(&mut ocr.language).desired_width(80.0)).changed() {
                        engine_changed.set(true);
                    }
                });

                ui.add_enabled_ui(ocr.backend == OcrBackend::Tesseract, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Tesseract executable:");
                        ui.add_space(8.0);
                        if ui.text_edit_singleline(&mut ocr.tesseract_path).changed() {
                            engine_changed.set(true);
                        }
                    });
                });

                ui.add_enabled_ui(ocr.backend == OcrBackend::Demo, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Demo text:");
                        ui.add_space(8.0);
                        if ui.text_edit_singleline(&mut ocr.demo_text).changed() {
                            engine_changed.set(true);
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Demo delay:");
                        ui.add_space(8.0);
                        if ui
                            .add(egui::Slider::new(&mut ocr.demo_delay_ms, 0..=10_000).suffix(" ms"))
                            .changed()
                        {
                            engine_changed.set(true);
                        }
                    });
                });

                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.label("Progress tick:");
                    ui.add_space(8.0);
                    if ui
                        .add(egui::Slider::new(&mut ocr.progress_interval_ms, 50..=2000).suffix(" ms"))
                        .changed()
                    {
                        engine_changed.set(true);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Progress step:");
                    ui.add_space(8.0);
                    if ui.add(egui::Slider::new(&mut ocr.progress_step, 1..=50).suffix("%")).changed() {
                        engine_changed.set(true);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Progress cap:");
                    ui.add_space(8.0);
                    if ui.add(egui::Slider::new(&mut ocr.progress_cap, 10..=99).suffix("%")).changed() {
                        engine_changed.set(true);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("Preview size:");
                    ui.add_space(8.0);
                    if ui
                        .add(egui::Slider::new(&mut ocr.preview_max_edge, 128..=2048).suffix(" px"))
                        .changed()
                    {
                        changed.set(true);
                    }
                });
            }
        });

        ui.add_space(16.0);

        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            if section_header(ui, view_state, SettingsSection::Attachments, "Attachments") {
                let mut state = shared_state.write();

                ui.horizontal(|ui| {
                    ui.label("Max attachment size:");
                    ui.add_space(8.0);
                    if ui
                        .add(egui::Slider::new(&mut state.config.attachments.max_size_mb, 1..=100).suffix(" MB"))
                        .changed()
                    {
                        changed.set(true);
                    }
                });

                let mut extensions = state.config.attachments.allowed_extensions.join(", ");
                ui.horizontal(|ui| {
                    ui.label("Allowed types:");
                    ui.add_space(8.0);
                    if ui.text_edit_singleline(&mut extensions).changed() {
                        state.config.attachments.allowed_extensions = parse_extensions(&extensions);
                        changed.set(true);
                    }
                });
                ui.label(
                    RichText::new("Comma separated, without the leading dot. OCR images are not limited.")
                        .size(11.0)
                        .color(ThemeColors::TEXT_MUTED)
                );
            }
        });

        ui.add_space(24.0);

        ui.horizontal(|ui| {
            if ui
                .add(egui::Button::new("Reset to Defaults").min_size(egui::vec2(120.0, 36.0)))
                .clicked()
            {
                shared_state.write().config = AppConfig::default();
                changed.set(true);
                engine_changed.set(true);
            }

            ui.add_space(16.0);

            let has_path = shared_state.read().config_path.is_some();
            let hint = if has_path {
                "Settings are saved automatically"
            } else {
                "No config directory; settings last for this session"
            };
            ui.label(RichText::new(hint).size(12.0).color(ThemeColors::TEXT_MUTED));
        });
    });

    // Picked up by the dashboard app: saves and rebuilds the engine
    if changed.get() || engine_changed.get() {
        view_state.has_unsaved_changes = true;
    }
    if engine_changed.get() {
        view_state.engine_dirty = true;
    }
}

/// Normalize a comma separated extension list
pub fn parse_extensions(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions(" PDF, .docx,,png "), vec!["pdf", "docx", "png"]);
        assert!(parse_extensions(" , ").is_empty());
    }
}
