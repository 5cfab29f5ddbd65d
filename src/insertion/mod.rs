//! Insertion Target Resolver
//!
//! Routes committed OCR text into exactly one field of the assessment state.
//! The destination is a tagged target fixed when the capture modal opened; a
//! target that no longer exists is reported as an error instead of dropped.

use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::assessment::{AssessmentState, PairSide, QuestionKind};

/// Destination field for captured text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionTarget {
    /// A question's body
    QuestionText { question_id: String },
    /// A question's marking scheme
    MarkingScheme { question_id: String },
    /// One multiple-choice option's text
    McqOption { question_id: String, option_id: String },
    /// One side of one matching pair. `index` is the pair's position when
    /// the target was picked and is only used for display.
    MatchingPair {
        question_id: String,
        pair_id: String,
        index: usize,
        side: PairSide,
    },
}

impl InsertionTarget {
    pub fn question_id(&self) -> &str {
        match self {
            InsertionTarget::QuestionText { question_id }
            | InsertionTarget::MarkingScheme { question_id }
            | InsertionTarget::McqOption { question_id, .. }
            | InsertionTarget::MatchingPair { question_id, .. } => question_id,
        }
    }

    /// Short description for the modal title
    pub fn describe(&self) -> String {
        match self {
            InsertionTarget::QuestionText { .. } => "question text".to_string(),
            InsertionTarget::MarkingScheme { .. } => "marking scheme".to_string(),
            InsertionTarget::McqOption { .. } => "option text".to_string(),
            InsertionTarget::MatchingPair { index, side, .. } => {
                format!("pair {} ({} item)", index + 1, side.label())
            }
        }
    }
}

impl fmt::Display for InsertionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.describe(), self.question_id())
    }
}

/// Whether committed text overwrites or extends the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionMode {
    #[default]
    Replace,
    Append,
}

impl InsertionMode {
    /// Combine the field's current value with committed text
    pub fn merge(&self, previous: &str, text: &str) -> String {
        match self {
            InsertionMode::Replace => text.to_string(),
            InsertionMode::Append => format!("{}\n{}", previous, text),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InsertionMode::Replace => "Replace",
            InsertionMode::Append => "Append",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InsertionError {
    #[error("question {0} no longer exists")]
    QuestionNotFound(String),
    #[error("option {option_id} no longer exists in question {question_id}")]
    OptionNotFound { question_id: String, option_id: String },
    #[error("matching pair {pair_id} no longer exists in question {question_id}")]
    PairNotFound { question_id: String, pair_id: String },
    #[error("question {question_id} is not a {expected} question")]
    WrongQuestionKind {
        question_id: String,
        expected: &'static str,
    },
}

/// Write `text` into the target field, returning the new snapshot
pub fn apply_insertion(
    state: &AssessmentState,
    target: &InsertionTarget,
    mode: InsertionMode,
    text: &str,
) -> Result<AssessmentState, InsertionError> {
    let question_id = target.question_id();
    let missing = || InsertionError::QuestionNotFound(question_id.to_string());

    let next = state.try_update_question(question_id, missing, |question| match target {
        InsertionTarget::QuestionText { .. } => {
            question.text = mode.merge(&question.text, text);
            Ok(())
        }
        InsertionTarget::MarkingScheme { .. } => {
            question.marking_scheme = mode.merge(&question.marking_scheme, text);
            Ok(())
        }
        InsertionTarget::McqOption { option_id, .. } => {
            let QuestionKind::Mcq { options } = &mut question.kind else {
                return Err(InsertionError::WrongQuestionKind {
                    question_id: question_id.to_string(),
                    expected: "multiple choice",
                });
            };
            let option = options
                .iter_mut()
                .find(|o| &o.id == option_id)
                .ok_or_else(|| InsertionError::OptionNotFound {
                    question_id: question_id.to_string(),
                    option_id: option_id.clone(),
                })?;
            option.text = mode.merge(&option.text, text);
            Ok(())
        }
        InsertionTarget::MatchingPair { pair_id, side, .. } => {
            let QuestionKind::Matching { pairs } = &mut question.kind else {
                return Err(InsertionError::WrongQuestionKind {
                    question_id: question_id.to_string(),
                    expected: "matching",
                });
            };
            let pair = pairs
                .iter_mut()
                .find(|p| &p.id == pair_id)
                .ok_or_else(|| InsertionError::PairNotFound {
                    question_id: question_id.to_string(),
                    pair_id: pair_id.clone(),
                })?;
            let item = pair.item_mut(*side);
            *item = mode.merge(&*item, text);
            Ok(())
        }
    })?;

    debug!("Inserted {} chars into {} ({:?})", text.len(), target, mode);
    Ok(next)
}
