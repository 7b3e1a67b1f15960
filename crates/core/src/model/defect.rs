use std::fmt;

use thiserror::Error;

use crate::model::MaterialId;

/// What is wrong with a generated question or card.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DefectKind {
    #[error("correct answer index {correct_answer} is outside the {options} available options")]
    CorrectAnswerOutOfRange { correct_answer: usize, options: usize },

    #[error("question offers {options} option(s), at least 2 expected")]
    TooFewOptions { options: usize },

    #[error("question prompt is empty")]
    EmptyPrompt,

    #[error("flashcard front is empty")]
    MissingFront,

    #[error("flashcard back is empty")]
    MissingBack,
}

impl DefectKind {
    /// Whether an item carrying this defect can never be credited as correct.
    #[must_use]
    pub fn blocks_credit(self) -> bool {
        matches!(
            self,
            DefectKind::CorrectAnswerOutOfRange { .. }
                | DefectKind::MissingFront
                | DefectKind::MissingBack
        )
    }
}

/// The item a defect was found on, by position in the session's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentItem {
    Question(usize),
    Flashcard(usize),
}

impl fmt::Display for ContentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentItem::Question(i) => write!(f, "question {}", i + 1),
            ContentItem::Flashcard(i) => write!(f, "flashcard {}", i + 1),
        }
    }
}

/// A content-integrity problem in material produced by the analysis backend.
///
/// Sessions surface these instead of guessing a recovery; an affected item is
/// still shown but is never credited as correct when its defect blocks credit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{item}: {kind}")]
pub struct ContentDefect {
    pub material_id: Option<MaterialId>,
    pub item: ContentItem,
    pub kind: DefectKind,
}

impl ContentDefect {
    #[must_use]
    pub fn new(material_id: Option<MaterialId>, item: ContentItem, kind: DefectKind) -> Self {
        Self {
            material_id,
            item,
            kind,
        }
    }
}
