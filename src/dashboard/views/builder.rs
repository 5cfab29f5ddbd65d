//! Builder view - Question editing
//!
//! Every text field gets an "OCR" button that opens the capture modal bound
//! to that field.

use egui::RichText;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assessment::{AssessmentState, NewQuestionKind, PairSide, Question, QuestionKind};
use crate::capture::{Attachment, AttachmentPolicy};
use crate::dashboard::state::BuilderViewState;
use crate::dashboard::theme::{self, ThemeColors};
use crate::insertion::InsertionTarget;
use crate::shared::SharedAppState;

/// A single edit raised by the builder widgets
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderEdit {
    AddQuestion { test_id: String, kind: NewQuestionKind },
    RemoveQuestion { question_id: String },
    QuestionText { question_id: String, text: String },
    MarkingScheme { question_id: String, text: String },
    Marks { question_id: String, marks: u32 },
    AddOption { question_id: String },
    OptionText { question_id: String, option_id: String, text: String },
    CorrectOption { question_id: String, option_id: String },
    RemoveOption { question_id: String, option_id: String },
    AddPair { question_id: String },
    PairItem { question_id: String, index: usize, side: PairSide, text: String },
    RemovePair { question_id: String, index: usize },
    AddAttachment { question_id: String, attachment: Attachment },
    RemoveAttachment { question_id: String, index: usize },
}

impl BuilderEdit {
    /// Apply to a snapshot. `None` when the edited item no longer exists.
    pub fn apply(&self, state: &AssessmentState) -> Option<AssessmentState> {
        match self {
            BuilderEdit::AddQuestion { test_id, kind } => state.add_question(test_id, *kind).map(|(next, _)| next),
            BuilderEdit::RemoveQuestion { question_id } => state.remove_question(question_id),
            BuilderEdit::QuestionText { question_id, text } => state.set_question_text(question_id, text),
            BuilderEdit::MarkingScheme { question_id, text } => state.set_marking_scheme(question_id, text),
            BuilderEdit::Marks { question_id, marks } => state.set_marks(question_id, *marks),
            BuilderEdit::AddOption { question_id } => state.add_option(question_id).map(|(next, _)| next),
            BuilderEdit::OptionText { question_id, option_id, text } => {
                state.set_option_text(question_id, option_id, text)
            }
            BuilderEdit::CorrectOption { question_id, option_id } => state.set_correct_option(question_id, option_id),
            BuilderEdit::RemoveOption { question_id, option_id } => state.remove_option(question_id, option_id),
            BuilderEdit::AddPair { question_id } => state.add_pair(question_id),
            BuilderEdit::PairItem { question_id, index, side, text } => {
                state.set_pair_item(question_id, *index, *side, text)
            }
            BuilderEdit::RemovePair { question_id, index } => state.remove_pair(question_id, *index),
            BuilderEdit::AddAttachment { question_id, attachment } => {
                state.add_attachment(question_id, attachment.clone())
            }
            BuilderEdit::RemoveAttachment { question_id, index } => state.remove_attachment(question_id, *index),
        }
    }
}

/// Render the builder view
pub fn render_builder_view(
    ui: &mut egui::Ui,
    view_state: &mut BuilderViewState,
    shared_state: &Arc<RwLock<SharedAppState>>,
) {
    let (assessment, policy) = {
        let state = shared_state.read();
        (state.assessment.clone(), state.config.attachments.policy())
    };

    ui.heading(RichText::new("Question Builder").size(24.0).strong());
    ui.add_space(8.0);
    ui.label(
        RichText::new("Edit questions by hand or capture text from a photo with OCR")
            .size(14.0)
            .color(ThemeColors::TEXT_SECONDARY)
    );
    ui.add_space(16.0);

    // Fall back to the first test when the selection is gone
    let selected = view_state
        .selected_test
        .clone()
        .filter(|id| assessment.test(id).is_some())
        .or_else(|| assessment.tests().first().map(|t| t.id.clone()));
    view_state.selected_test = selected.clone();

    let Some(test) = selected.as_deref().and_then(|id| assessment.test(id)) else {
        ui.label(RichText::new("No tests to edit").color(ThemeColors::TEXT_MUTED));
        return;
    };

    let mut edits: Vec<BuilderEdit> = Vec::new();

    ui.horizontal(|ui| {
        egui::ComboBox::from_id_salt("test_picker")
            .selected_text(&test.title)
            .show_ui(ui, |ui| {
                for t in assessment.tests() {
                    ui.selectable_value(&mut view_state.selected_test, Some(t.id.clone()), &t.title);
                }
            });

        ui.add_space(16.0);

        egui::ComboBox::from_id_salt("new_kind")
            .selected_text(view_state.new_kind.label())
            .show_ui(ui, |ui| {
                for kind in [NewQuestionKind::Mcq, NewQuestionKind::Matching, NewQuestionKind::Subjective] {
                    ui.selectable_value(&mut view_state.new_kind, kind, kind.label());
                }
            });
        if ui.button("Add question").clicked() {
            edits.push(BuilderEdit::AddQuestion {
                test_id: test.id.clone(),
                kind: view_state.new_kind,
            });
        }
    });

    ui.add_space(16.0);

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        for (number, question) in test.questions.iter().enumerate() {
            ui.push_id(&question.id, |ui| {
                theme::section_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    render_question(ui, number + 1, question, view_state, &mut edits);
                    render_attachments(ui, question, view_state, &policy, &mut edits);
                });
            });
            ui.add_space(12.0);
        }
    });

    if edits.is_empty() {
        return;
    }
    let mut state = shared_state.write();
    for edit in edits {
        match edit.apply(&state.assessment) {
            Some(next) => state.commit_assessment(next),
            None => warn!("Builder edit no longer applies: {:?}", edit),
        }
    }
}

/// A labelled text field with an OCR button. Returns the new text if edited.
fn field_with_ocr(
    ui: &mut egui::Ui,
    label: &str,
    value: &str,
    multiline: bool,
    target: InsertionTarget,
    view_state: &mut BuilderViewState,
) -> Option<String> {
    let mut text = value.to_string();
    let mut changed = false;

    ui.horizontal(|ui| {
        if !label.is_empty() {
            ui.label(RichText::new(label).color(ThemeColors::TEXT_MUTED));
        }
        let width = (ui.available_width() - 70.0).max(120.0);
        let edit = if multiline {
            egui::TextEdit::multiline(&mut text).desired_rows(2)
        } else {
            egui::TextEdit::singleline(&mut text)
        };
        changed = ui.add(edit.desired_width(width)).changed();

        if ui.button("OCR").on_hover_text("Fill from a photo").clicked() {
            view_state.pending_capture = Some(target);
        }
    });

    changed.then_some(text)
}

fn render_question(
    ui: &mut egui::Ui,
    number: usize,
    question: &Question,
    view_state: &mut BuilderViewState,
    edits: &mut Vec<BuilderEdit>,
) {
    let question_id = question.id.clone();

    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("Q{}", number)).size(16.0).strong());
        ui.label(RichText::new(question.kind.label()).color(ThemeColors::TEXT_SECONDARY));
        ui.add_space(12.0);

        let mut marks = question.marks;
        ui.label("Marks:");
        if ui.add(egui::DragValue::new(&mut marks).range(0..=100)).changed() {
            edits.push(BuilderEdit::Marks { question_id: question_id.clone(), marks });
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button(RichText::new("Remove").color(ThemeColors::ACCENT_ERROR)).clicked() {
                edits.push(BuilderEdit::RemoveQuestion { question_id: question_id.clone() });
            }
        });
    });

    ui.add_space(8.0);

    let target = InsertionTarget::QuestionText { question_id: question_id.clone() };
    if let Some(text) = field_with_ocr(ui, "Question", &question.text, true, target, view_state) {
        edits.push(BuilderEdit::QuestionText { question_id: question_id.clone(), text });
    }

    let target = InsertionTarget::MarkingScheme { question_id: question_id.clone() };
    if let Some(text) = field_with_ocr(ui, "Marking", &question.marking_scheme, true, target, view_state) {
        edits.push(BuilderEdit::MarkingScheme { question_id: question_id.clone(), text });
    }

    ui.add_space(8.0);

    match &question.kind {
        QuestionKind::Mcq { options } => {
            for (i, option) in options.iter().enumerate() {
                ui.push_id(&option.id, |ui| {
                    ui.horizontal(|ui| {
                        if ui.radio(option.correct, "").on_hover_text("Correct answer").clicked() {
                            edits.push(BuilderEdit::CorrectOption {
                                question_id: question_id.clone(),
                                option_id: option.id.clone(),
                            });
                        }
                        let label = format!("{}.", (b'A' + (i % 26) as u8) as char);
                        let target = InsertionTarget::McqOption {
                            question_id: question_id.clone(),
                            option_id: option.id.clone(),
                        };
                        if let Some(text) = field_with_ocr(ui, &label, &option.text, false, target, view_state) {
                            edits.push(BuilderEdit::OptionText {
                                question_id: question_id.clone(),
                                option_id: option.id.clone(),
                                text,
                            });
                        }
                        if ui.small_button("x").on_hover_text("Remove option").clicked() {
                            edits.push(BuilderEdit::RemoveOption {
                                question_id: question_id.clone(),
                                option_id: option.id.clone(),
                            });
                        }
                    });
                });
            }
            if ui.button("Add option").clicked() {
                edits.push(BuilderEdit::AddOption { question_id: question_id.clone() });
            }
        }
        QuestionKind::Matching { pairs } => {
            for (index, pair) in pairs.iter().enumerate() {
                ui.push_id(&pair.id, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(format!("{}.", index + 1));
                        for side in [PairSide::Left, PairSide::Right] {
                            ui.scope(|ui| {
                                ui.set_max_width(ui.available_width() / 2.0 - 20.0);
                                let target = InsertionTarget::MatchingPair {
                                    question_id: question_id.clone(),
                                    pair_id: pair.id.clone(),
                                    index,
                                    side,
                                };
                                if let Some(text) = field_with_ocr(ui, "", pair.item(side), false, target, view_state) {
                                    edits.push(BuilderEdit::PairItem {
                                        question_id: question_id.clone(),
                                        index,
                                        side,
                                        text,
                                    });
                                }
                            });
                        }
                        if ui.small_button("x").on_hover_text("Remove pair").clicked() {
                            edits.push(BuilderEdit::RemovePair { question_id: question_id.clone(), index });
                        }
                    });
                });
            }
            if ui.button("Add pair").clicked() {
                edits.push(BuilderEdit::AddPair { question_id: question_id.clone() });
            }
        }
        QuestionKind::Subjective => {
            ui.label(
                RichText::new("Written answer, graded with the marking scheme")
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED)
            );
        }
    }
}

fn render_attachments(
    ui: &mut egui::Ui,
    question: &Question,
    view_state: &mut BuilderViewState,
    policy: &AttachmentPolicy,
    edits: &mut Vec<BuilderEdit>,
) {
    ui.add_space(8.0);
    ui.separator();

    for (index, attachment) in question.attachments.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(RichText::new(&attachment.name).color(ThemeColors::TEXT_SECONDARY));
            ui.label(
                RichText::new(format!("{:.1} KB", attachment.size_bytes as f64 / 1024.0))
                    .size(12.0)
                    .color(ThemeColors::TEXT_MUTED)
            );
            if ui.small_button("x").on_hover_text("Remove attachment").clicked() {
                edits.push(BuilderEdit::RemoveAttachment {
                    question_id: question.id.clone(),
                    index,
                });
            }
        });
    }

    ui.horizontal(|ui| {
        let input = view_state.attachment_inputs.entry(question.id.clone()).or_default();
        ui.add(
            egui::TextEdit::singleline(input)
                .hint_text("Path to a file to attach")
                .desired_width(320.0),
        );
        if ui.button("Attach").clicked() {
            edits.extend(attach_from_input(view_state, policy, &question.id));
        }
    });

    if let Some(notice) = view_state.attachment_notices.get(&question.id) {
        ui.add_space(4.0);
        theme::banner(ui, ThemeColors::ACCENT_WARNING, "Not attached:", notice);
    }
}

/// Check the typed path for a question. A rejection stays next to the
/// question until its next successful attach.
fn attach_from_input(
    view_state: &mut BuilderViewState,
    policy: &AttachmentPolicy,
    question_id: &str,
) -> Option<BuilderEdit> {
    let input = view_state.attachment_inputs.get_mut(question_id)?;
    let path = input.trim();
    if path.is_empty() {
        return None;
    }

    match policy.validate_path(Path::new(path)) {
        Ok(attachment) => {
            info!("Attaching {} to {}", attachment.name, question_id);
            input.clear();
            view_state.attachment_notices.remove(question_id);
            Some(BuilderEdit::AddAttachment {
                question_id: question_id.to_string(),
                attachment,
            })
        }
        Err(e) => {
            warn!("Attachment rejected: {}", e);
            view_state.attachment_notices.insert(question_id.to_string(), e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_apply_to_snapshot() {
        let state = AssessmentState::with_sample_data();

        let next = BuilderEdit::MarkingScheme {
            question_id: "q-bio-3".to_string(),
            text: "2 marks for turgor pressure".to_string(),
        }
        .apply(&state)
        .unwrap();

        assert_eq!(next.question("q-bio-3").unwrap().marking_scheme, "2 marks for turgor pressure");
        assert_eq!(state.question("q-bio-3").unwrap().marking_scheme, "");
    }

    #[test]
    fn test_add_question_edit() {
        let state = AssessmentState::with_sample_data();
        let next = BuilderEdit::AddQuestion {
            test_id: "t-math".to_string(),
            kind: NewQuestionKind::Matching,
        }
        .apply(&state)
        .unwrap();
        assert_eq!(next.test("t-math").unwrap().questions.len(), 2);
    }

    #[test]
    fn test_edit_on_removed_question() {
        let state = AssessmentState::with_sample_data()
            .remove_question("q-bio-2")
            .unwrap();
        let edit = BuilderEdit::PairItem {
            question_id: "q-bio-2".to_string(),
            index: 0,
            side: PairSide::Left,
            text: "Vacuole".to_string(),
        };
        assert!(edit.apply(&state).is_none());
    }

    #[test]
    fn test_rejected_attachment_notice_clears_on_next_attach() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("answers.exe");
        let handout = dir.path().join("handout.pdf");
        std::fs::write(&script, b"MZ").unwrap();
        std::fs::write(&handout, b"%PDF-1.7").unwrap();

        let policy = AttachmentPolicy {
            max_bytes: 1024,
            allowed_extensions: vec!["pdf".to_string()],
        };
        let mut view_state = BuilderViewState::default();

        view_state
            .attachment_inputs
            .insert("q-bio-1".to_string(), script.display().to_string());
        assert!(attach_from_input(&mut view_state, &policy, "q-bio-1").is_none());
        let notice = view_state.attachment_notices.get("q-bio-1").unwrap();
        assert!(notice.contains("answers.exe"));
        // Input kept so the path can be corrected
        assert_eq!(view_state.attachment_inputs["q-bio-1"], script.display().to_string());
        assert!(view_state.attachment_notices.get("q-bio-3").is_none());

        view_state
            .attachment_inputs
            .insert("q-bio-1".to_string(), handout.display().to_string());
        let edit = attach_from_input(&mut view_state, &policy, "q-bio-1").unwrap();

        assert!(matches!(
            &edit,
            BuilderEdit::AddAttachment { question_id, attachment }
                if question_id == "q-bio-1" && attachment.name == "handout.pdf"
        ));
        assert!(view_state.attachment_notices.is_empty());
        assert!(view_state.attachment_inputs["q-bio-1"].is_empty());
    }

    #[test]
    fn test_blank_attachment_input_is_ignored() {
        let policy = AttachmentPolicy {
            max_bytes: 1024,
            allowed_extensions: vec!["pdf".to_string()],
        };
        let mut view_state = BuilderViewState::default();
        view_state.attachment_inputs.insert("q-bio-1".to_string(), "   ".to_string());

        assert!(attach_from_input(&mut view_state, &policy, "q-bio-1").is_none());
        assert!(attach_from_input(&mut view_state, &policy, "q-unknown").is_none());
        assert!(view_state.attachment_notices.is_empty());
    }
}
