//! Test and question definitions

use crate::capture::attachment::Attachment;

/// A test made of questions
#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    /// Test identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Subject name
    pub subject: String,
    /// Time allowed
    pub duration_minutes: u32,
    /// Questions in display order
    pub questions: Vec<Question>,
}

/// A single question
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Question identifier (unique across all tests)
    pub id: String,
    /// Question body
    pub text: String,
    /// Marking scheme shown to graders
    pub marking_scheme: String,
    /// Marks awarded
    pub marks: u32,
    /// Kind-specific content
    pub kind: QuestionKind,
    /// Supporting files
    pub attachments: Vec<Attachment>,
}

/// Question kind and its answer structure
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Multiple choice
    Mcq { options: Vec<McqOption> },
    /// Match left items to right items
    Matching { pairs: Vec<MatchingPair> },
    /// Free-form written answer
    Subjective,
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Mcq { .. } => "Multiple choice",
            QuestionKind::Matching { .. } => "Matching",
            QuestionKind::Subjective => "Subjective",
        }
    }
}

/// Kind selector used when creating questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewQuestionKind {
    Mcq,
    Matching,
    Subjective,
}

impl NewQuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            NewQuestionKind::Mcq => "Multiple choice",
            NewQuestionKind::Matching => "Matching",
            NewQuestionKind::Subjective => "Subjective",
        }
    }
}

/// One multiple-choice option
#[derive(Debug, Clone, PartialEq)]
pub struct McqOption {
    /// Option identifier
    pub id: String,
    /// Option text
    pub text: String,
    /// Whether this is the correct answer
    pub correct: bool,
}

/// One row of a matching question
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingPair {
    /// Stable across reorders and removals of sibling pairs
    pub id: String,
    pub left_item: String,
    pub right_item: String,
}

/// Side of a matching pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Left,
    Right,
}

impl PairSide {
    pub fn label(&self) -> &'static str {
        match self {
            PairSide::Left => "left",
            PairSide::Right => "right",
        }
    }
}

impl MatchingPair {
    pub fn empty(id: String) -> Self {
        Self {
            id,
            left_item: String::new(),
            right_item: String::new(),
        }
    }

    pub fn item(&self, side: PairSide) -> &str {
        match side {
            PairSide::Left => &self.left_item,
            PairSide::Right => &self.right_item,
        }
    }

    pub fn item_mut(&mut self, side: PairSide) -> &mut String {
        match side {
            PairSide::Left => &mut self.left_item,
            PairSide::Right => &mut self.right_item,
        }
    }
}

fn option(id: &str, text: &str, correct: bool) -> McqOption {
    McqOption {
        id: id.to_string(),
        text: text.to_string(),
        correct,
    }
}

fn pair(id: &str, left: &str, right: &str) -> MatchingPair {
    MatchingPair {
        id: id.to_string(),
        left_item: left.to_string(),
        right_item: right.to_string(),
    }
}

/// Bundled sample tests shown on first launch
pub fn sample_tests() -> Vec<Test> {
    vec![
        Test {
            id: "t-bio".to_string(),
            title: "Cell Biology Unit Test".to_string(),
            subject: "Biology".to_string(),
            duration_minutes: 45,
            questions: vec![
                Question {
                    id: "q-bio-1".to_string(),
                    text: "Which organelle produces most of the cell's ATP?".to_string(),
                    marking_scheme: "1 mark for the correct option.".to_string(),
                    marks: 1,
                    kind: QuestionKind::Mcq {
                        options: vec![
                            option("q-bio-1-a", "Mitochondria", true),
                            option("q-bio-1-b", "Ribosome", false),
                            option("q-bio-1-c", "Golgi apparatus", false),
                            option("q-bio-1-d", "", false),
                        ],
                    },
                    attachments: Vec::new(),
                },
                Question {
                    id: "q-bio-2".to_string(),
                    text: "Match each structure to its function.".to_string(),
                    marking_scheme: "1 mark per correct pair.".to_string(),
                    marks: 3,
                    kind: QuestionKind::Matching {
                        pairs: vec![
                            pair("q-bio-2-p1", "Nucleus", "Stores genetic material"),
                            pair("q-bio-2-p2", "Cell membrane", "Controls what enters the cell"),
                            pair("q-bio-2-p3", "Chloroplast", "Site of photosynthesis"),
                        ],
                    },
                    attachments: Vec::new(),
                },
                Question {
                    id: "q-bio-3".to_string(),
                    text: "Explain the role of osmosis in plant cells.".to_string(),
                    marking_scheme: String::new(),
                    marks: 4,
                    kind: QuestionKind::Subjective,
                    attachments: Vec::new(),
                },
            ],
        },
        Test {
            id: "t-math".to_string(),
            title: "Algebra Quiz".to_string(),
            subject: "Mathematics".to_string(),
            duration_minutes: 30,
            questions: vec![Question {
                id: "q-math-1".to_string(),
                text: "Solve for x: 2x + 6 = 14".to_string(),
                marking_scheme: "x = 4".to_string(),
                marks: 2,
                kind: QuestionKind::Mcq {
                    options: vec![
                        option("q-math-1-a", "3", false),
                        option("q-math-1-b", "4", true),
                        option("q-math-1-c", "10", false),
                    ],
                },
                attachments: Vec::new(),
            }],
        },
    ]
}
