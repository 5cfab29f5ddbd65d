//! Assessment Model
//!
//! In-memory tests and questions edited by the builder. `AssessmentState` is a
//! snapshot: every update takes `&self` and hands back a new state, leaving the
//! original untouched. Nothing here is persisted.

pub mod model;

pub use model::{
    sample_tests, MatchingPair, McqOption, NewQuestionKind, PairSide, Question, QuestionKind,
    Test,
};

use uuid::Uuid;

use crate::capture::attachment::Attachment;

/// Snapshot of every test known to the dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentState {
    tests: Vec<Test>,
}

/// Counts shown on the home view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssessmentSummary {
    pub tests: usize,
    pub questions: usize,
    pub mcq: usize,
    pub matching: usize,
    pub subjective: usize,
    pub total_marks: u32,
}

fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

impl AssessmentState {
    pub fn new(tests: Vec<Test>) -> Self {
        Self { tests }
    }

    /// State seeded with the bundled sample tests
    pub fn with_sample_data() -> Self {
        Self::new(sample_tests())
    }

    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn test(&self, test_id: &str) -> Option<&Test> {
        self.tests.iter().find(|t| t.id == test_id)
    }

    /// Find a question in any test
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.tests
            .iter()
            .flat_map(|t| t.questions.iter())
            .find(|q| q.id == question_id)
    }

    pub fn summary(&self) -> AssessmentSummary {
        let mut summary = AssessmentSummary {
            tests: self.tests.len(),
            ..Default::default()
        };
        for question in self.tests.iter().flat_map(|t| t.questions.iter()) {
            summary.questions += 1;
            summary.total_marks += question.marks;
            match question.kind {
                QuestionKind::Mcq { .. } => summary.mcq += 1,
                QuestionKind::Matching { .. } => summary.matching += 1,
                QuestionKind::Subjective => summary.subjective += 1,
            }
        }
        summary
    }

    /// Apply a fallible edit to one question, producing a new snapshot.
    ///
    /// `missing` builds the error when no question has `question_id`. If `edit`
    /// fails the partially edited copy is discarded.
    pub fn try_update_question<E>(
        &self,
        question_id: &str,
        missing: impl FnOnce() -> E,
        edit: impl FnOnce(&mut Question) -> Result<(), E>,
    ) -> Result<Self, E> {
        let mut next = self.clone();
        let question = next
            .tests
            .iter_mut()
            .flat_map(|t| t.questions.iter_mut())
            .find(|q| q.id == question_id)
            .ok_or_else(missing)?;
        edit(question)?;
        Ok(next)
    }

    fn edit_question(&self, question_id: &str, edit: impl FnOnce(&mut Question) -> bool) -> Option<Self> {
        self.try_update_question(question_id, || (), |q| if edit(q) { Ok(()) } else { Err(()) })
            .ok()
    }

    /// Append a blank question to a test, returning the new state and question id
    pub fn add_question(&self, test_id: &str, kind: NewQuestionKind) -> Option<(Self, String)> {
        let mut next = self.clone();
        let test = next.tests.iter_mut().find(|t| t.id == test_id)?;
        let id = new_id("q");
        let kind = match kind {
            NewQuestionKind::Mcq => QuestionKind::Mcq {
                options: (0..2)
                    .map(|_| McqOption {
                        id: new_id("opt"),
                        text: String::new(),
                        correct: false,
                    })
                    .collect(),
            },
            NewQuestionKind::Matching => QuestionKind::Matching {
                pairs: vec![MatchingPair::empty(new_id("pair"))],
            },
            NewQuestionKind::Subjective => QuestionKind::Subjective,
        };
        test.questions.push(Question {
            id: id.clone(),
            text: String::new(),
            marking_scheme: String::new(),
            marks: 1,
            kind,
            attachments: Vec::new(),
        });
        Some((next, id))
    }

    pub fn remove_question(&self, question_id: &str) -> Option<Self> {
        let mut next = self.clone();
        for test in &mut next.tests {
            if let Some(pos) = test.questions.iter().position(|q| q.id == question_id) {
                test.questions.remove(pos);
                return Some(next);
            }
        }
        None
    }

    pub fn set_question_text(&self, question_id: &str, text: &str) -> Option<Self> {
        self.edit_question(question_id, |q| {
            q.text = text.to_string();
            true
        })
    }

    pub fn set_marking_scheme(&self, question_id: &str, text: &str) -> Option<Self> {
        self.edit_question(question_id, |q| {
            q.marking_scheme = text.to_string();
            true
        })
    }

    pub fn set_marks(&self, question_id: &str, marks: u32) -> Option<Self> {
        self.edit_question(question_id, |q| {
            q.marks = marks;
            true
        })
    }

    /// Add an empty option to a multiple-choice question
    pub fn add_option(&self, question_id: &str) -> Option<(Self, String)> {
        let id = new_id("opt");
        let next = self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Mcq { options } => {
                options.push(McqOption {
                    id: id.clone(),
                    text: String::new(),
                    correct: false,
                });
                true
            }
            _ => false,
        })?;
        Some((next, id))
    }

    pub fn set_option_text(&self, question_id: &str, option_id: &str, text: &str) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Mcq { options } => match options.iter_mut().find(|o| o.id == option_id) {
                Some(option) => {
                    option.text = text.to_string();
                    true
                }
                None => false,
            },
            _ => false,
        })
    }

    /// Mark one option correct and clear the others
    pub fn set_correct_option(&self, question_id: &str, option_id: &str) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Mcq { options } if options.iter().any(|o| o.id == option_id) => {
                for option in options.iter_mut() {
                    option.correct = option.id == option_id;
                }
                true
            }
            _ => false,
        })
    }

    pub fn remove_option(&self, question_id: &str, option_id: &str) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Mcq { options } => {
                let before = options.len();
                options.retain(|o| o.id != option_id);
                options.len() != before
            }
            _ => false,
        })
    }

    pub fn add_pair(&self, question_id: &str) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Matching { pairs } => {
                pairs.push(MatchingPair::empty(new_id("pair")));
                true
            }
            _ => false,
        })
    }

    pub fn set_pair_item(&self, question_id: &str, index: usize, side: PairSide, text: &str) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Matching { pairs } => match pairs.get_mut(index) {
                Some(pair) => {
                    *pair.item_mut(side) = text.to_string();
                    true
                }
                None => false,
            },
            _ => false,
        })
    }

    pub fn remove_pair(&self, question_id: &str, index: usize) -> Option<Self> {
        self.edit_question(question_id, |q| match &mut q.kind {
            QuestionKind::Matching { pairs } if index < pairs.len() => {
                pairs.remove(index);
                true
            }
            _ => false,
        })
    }

    pub fn add_attachment(&self, question_id: &str, attachment: Attachment) -> Option<Self> {
        self.edit_question(question_id, |q| {
            q.attachments.push(attachment);
            true
        })
    }

    pub fn remove_attachment(&self, question_id: &str, index: usize) -> Option<Self> {
        self.edit_question(question_id, |q| {
            if index < q.attachments.len() {
                q.attachments.remove(index);
                true
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_of(state: &AssessmentState, question_id: &str) -> Vec<McqOption> {
        match &state.question(question_id).unwrap().kind {
            QuestionKind::Mcq { options } => options.clone(),
            other => panic!("expected mcq, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_summary() {
        let state = AssessmentState::with_sample_data();
        let summary = state.summary();

        assert_eq!(summary.tests, 2);
        assert_eq!(summary.questions, 4);
        assert_eq!(summary.mcq, 2);
        assert_eq!(summary.matching, 1);
        assert_eq!(summary.subjective, 1);
        assert_eq!(summary.total_marks, 10);
    }

    #[test]
    fn test_updates_leave_original_snapshot_untouched() {
        let state = AssessmentState::with_sample_data();
        let next = state.set_question_text("q-bio-3", "Define osmosis.").unwrap();

        assert_eq!(next.question("q-bio-3").unwrap().text, "Define osmosis.");
        assert_eq!(
            state.question("q-bio-3").unwrap().text,
            "Explain the role of osmosis in plant cells."
        );
    }

    #[test]
    fn test_add_question_of_each_kind() {
        let state = AssessmentState::with_sample_data();

        let (state, mcq_id) = state.add_question("t-math", NewQuestionKind::Mcq).unwrap();
        let (state, matching_id) = state.add_question("t-math", NewQuestionKind::Matching).unwrap();

        assert_eq!(options_of(&state, &mcq_id).len(), 2);
        assert!(matches!(
            &state.question(&matching_id).unwrap().kind,
            QuestionKind::Matching { pairs } if pairs.len() == 1
        ));
        assert_eq!(state.test("t-math").unwrap().questions.len(), 3);
        assert!(state.add_question("missing", NewQuestionKind::Subjective).is_none());
    }

    #[test]
    fn test_option_lifecycle() {
        let state = AssessmentState::with_sample_data();

        let (state, option_id) = state.add_option("q-math-1").unwrap();
        let state = state.set_option_text("q-math-1", &option_id, "7").unwrap();
        let state = state.set_correct_option("q-math-1", &option_id).unwrap();

        let options = options_of(&state, "q-math-1");
        assert_eq!(options.len(), 4);
        assert_eq!(options.iter().filter(|o| o.correct).count(), 1);
        assert!(options.iter().any(|o| o.id == option_id && o.correct && o.text == "7"));

        let state = state.remove_option("q-math-1", &option_id).unwrap();
        assert_eq!(options_of(&state, "q-math-1").len(), 3);
        assert!(state.remove_option("q-math-1", &option_id).is_none());
    }

    #[test]
    fn test_option_ops_reject_non_mcq_questions() {
        let state = AssessmentState::with_sample_data();

        assert!(state.add_option("q-bio-2").is_none());
        assert!(state.set_option_text("q-bio-3", "q-bio-1-a", "x").is_none());
        assert!(state.set_correct_option("q-bio-1", "nope").is_none());
    }

    #[test]
    fn test_pair_lifecycle() {
        let state = AssessmentState::with_sample_data();

        let state = state.add_pair("q-bio-2").unwrap();
        let state = state.set_pair_item("q-bio-2", 3, PairSide::Right, "Protein synthesis").unwrap();
        let state = state.set_pair_item("q-bio-2", 3, PairSide::Left, "Ribosome").unwrap();

        match &state.question("q-bio-2").unwrap().kind {
            QuestionKind::Matching { pairs } => {
                assert_eq!(pairs.len(), 4);
                assert_eq!(pairs[3].left_item, "Ribosome");
                assert_eq!(pairs[3].item(PairSide::Right), "Protein synthesis");
                assert!(pairs[3].id.starts_with("pair-"));
                assert!(pairs[..3].iter().all(|p| p.id != pairs[3].id));
            }
            other => panic!("expected matching, got {:?}", other),
        }

        let state = state.remove_pair("q-bio-2", 0).unwrap();
        assert!(state.remove_pair("q-bio-2", 3).is_none());
        assert!(state.set_pair_item("q-bio-2", 9, PairSide::Left, "x").is_none());
    }

    #[test]
    fn test_remove_question() {
        let state = AssessmentState::with_sample_data();
        let next = state.remove_question("q-bio-2").unwrap();

        assert!(next.question("q-bio-2").is_none());
        assert_eq!(next.summary().questions, 3);
        assert!(next.remove_question("q-bio-2").is_none());
    }

    #[test]
    fn test_attachments() {
        let state = AssessmentState::with_sample_data();
        let attachment = Attachment {
            name: "diagram.png".to_string(),
            size_bytes: 2048,
        };

        let state = state.add_attachment("q-bio-3", attachment.clone()).unwrap();
        assert_eq!(state.question("q-bio-3").unwrap().attachments, vec![attachment]);

        let state = state.remove_attachment("q-bio-3", 0).unwrap();
        assert!(state.question("q-bio-3").unwrap().attachments.is_empty());
        assert!(state.remove_attachment("q-bio-3", 0).is_none());
    }
}
