//! OCR capture modal
//!
//! Drawn over the builder while a capture session is open. The modal only
//! edits the review buffer directly; everything else is returned as
//! `ModalAction`s for the dashboard to apply to the workbench.

use egui::load::SizedTexture;
use egui::RichText;

use crate::capture::{CapturePhase, CaptureSession, JobStatus, UploadedImage};
use crate::dashboard::state::{CaptureModalState, ModalAction};
use crate::dashboard::theme::{self, color_with_alpha, ThemeColors};
use crate::insertion::InsertionMode;

const PREVIEW_MAX: egui::Vec2 = egui::vec2(480.0, 300.0);

/// One-line summary of where the session is
pub fn status_line(session: &CaptureSession) -> String {
    match session.phase() {
        CapturePhase::Empty => "Drop a photo of the text, or enter its path".to_string(),
        CapturePhase::ImageLoaded => match session.job().map(|j| j.status) {
            Some(JobStatus::Failed) => "Recognition failed. Retry or load another image".to_string(),
            _ => "Image loaded".to_string(),
        },
        CapturePhase::Recognizing => {
            let progress = session.job().map(|j| j.progress).unwrap_or(0);
            format!("Extracting text... {}%", progress)
        }
        CapturePhase::TextReady => "Review the text, then replace or append".to_string(),
        CapturePhase::Committed => "Inserted".to_string(),
    }
}

/// Render the modal. Returns the actions the user took this frame.
pub fn render_ocr_modal(
    ctx: &egui::Context,
    state: &mut CaptureModalState,
    session: &mut CaptureSession,
) -> Vec<ModalAction> {
    let mut actions = Vec::new();
    let mut open = true;

    egui::Window::new(format!("Capture text: {}", session.target().describe()))
        .id(egui::Id::new("ocr_modal"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(560.0)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RichText::new(status_line(session)).color(ThemeColors::TEXT_SECONDARY));
            ui.add_space(8.0);

            if let Some(error) = session.last_error() {
                theme::banner(ui, ThemeColors::ACCENT_ERROR, "Error:", error);
                ui.add_space(8.0);
            }
            if let Some(notice) = &state.notice {
                theme::banner(ui, ThemeColors::ACCENT_WARNING, "Note:", notice);
                ui.add_space(8.0);
            }

            match session.image() {
                Some(image) => render_preview(ui, state, image, &mut actions),
                None => render_drop_zone(ui, state, &mut actions),
            }

            ui.add_space(8.0);
            render_job(ui, session, &mut actions);

            if let Some(review) = session.review_mut() {
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Extracted text").strong());
                    if review.is_edited() {
                        ui.label(RichText::new("(edited)").size(12.0).color(ThemeColors::TEXT_MUTED));
                        if ui.small_button("Reset").clicked() {
                            review.reset();
                        }
                    }
                });
                ui.add(
                    egui::TextEdit::multiline(&mut review.buffer)
                        .desired_rows(8)
                        .desired_width(f32::INFINITY),
                );

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Copy").clicked() {
                        ui.ctx().copy_text(review.text().to_string());
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        for mode in [InsertionMode::Append, InsertionMode::Replace] {
                            let button = egui::Button::new(RichText::new(mode.label()).color(egui::Color32::WHITE))
                                .fill(ThemeColors::ACCENT_PRIMARY);
                            if ui.add(button).clicked() {
                                actions.push(ModalAction::Commit(mode));
                            }
                        }
                    });
                });
            }
        });

    if !open {
        actions.push(ModalAction::Close);
    }
    actions
}

fn render_drop_zone(ui: &mut egui::Ui, state: &mut CaptureModalState, actions: &mut Vec<ModalAction>) {
    let hovering = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    let stroke_color = if hovering { ThemeColors::ACCENT_PRIMARY } else { ThemeColors::BORDER };

    egui::Frame::none()
        .fill(color_with_alpha(ThemeColors::BG_LIGHT, 160))
        .stroke(egui::Stroke::new(1.5, stroke_color))
        .rounding(egui::Rounding::same(8.0))
        .inner_margin(24.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("Drop an image here").size(16.0).color(ThemeColors::TEXT_PRIMARY));
                ui.label(
                    RichText::new("PNG, JPEG, GIF, WebP, BMP or TIFF")
                        .size(12.0)
                        .color(ThemeColors::TEXT_MUTED)
                );
            });
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.path_input)
                .hint_text("or type a path")
                .desired_width(ui.available_width() - 80.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Load").clicked() || submitted) && !state.path_input.trim().is_empty() {
            actions.push(ModalAction::SubmitPath(state.path_input.trim().to_string()));
        }
    });
}

fn render_preview(
    ui: &mut egui::Ui,
    state: &mut CaptureModalState,
    image: &UploadedImage,
    actions: &mut Vec<ModalAction>,
) {
    // Upload the preview once per image
    let stale = state.preview_texture.as_ref().map(|(id, _)| *id) != Some(image.id);
    if stale {
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [image.preview.width as usize, image.preview.height as usize],
            &image.preview.rgba,
        );
        let texture = ui.ctx().load_texture(
            format!("ocr-preview-{}", image.id),
            color,
            egui::TextureOptions::LINEAR,
        );
        state.preview_texture = Some((image.id, texture));
    }

    if let Some((_, texture)) = &state.preview_texture {
        ui.vertical_centered(|ui| {
            ui.add(
                egui::Image::from_texture(SizedTexture::from_handle(texture))
                    .max_size(PREVIEW_MAX)
                    .maintain_aspect_ratio(true)
                    .rounding(6.0),
            );
        });
    }

    ui.horizontal(|ui| {
        ui.label(RichText::new(&image.original.name).strong());
        ui.label(
            RichText::new(format!(
                "{} · {} bytes",
                image.original.mime_type(),
                image.original.bytes.len()
            ))
            .size(12.0)
            .color(ThemeColors::TEXT_MUTED)
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Discard image").clicked() {
                actions.push(ModalAction::Discard);
            }
        });
    });
}

fn render_job(ui: &mut egui::Ui, session: &CaptureSession, actions: &mut Vec<ModalAction>) {
    let Some(job) = session.job() else {
        return;
    };
    match job.status {
        JobStatus::Running => {
            ui.add(
                egui::ProgressBar::new(f32::from(job.progress) / 100.0)
                    .show_percentage()
                    .animate(true),
            );
        }
        JobStatus::Failed => {
            if ui.button("Retry").clicked() {
                actions.push(ModalAction::Retry);
            }
        }
        JobStatus::Done | JobStatus::Idle => {}
    }
}
