//! Learning-session engine: quiz progression/scoring and the flashcard review loop.

mod flashcard;
mod flatten;
mod quiz;
mod scoring;

pub use flashcard::{
    CardOutcome, Face, FlashcardEvent, FlashcardSession, FlashcardState, PassKind, PassSummary,
};
pub use flatten::{FlatQuestion, QuizScope, flatten_material, flatten_module};
pub use quiz::{AnswerFeedback, QuizEvent, QuizProgress, QuizSession, QuizState};
pub use scoring::QuizScore;
