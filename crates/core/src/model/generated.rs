use serde::{Deserialize, Serialize};

use crate::model::{ContentDefect, ContentItem, DefectKind, MaterialId};

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Condensed overview of a document produced by the analysis backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(default)]
    pub main_points: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub key_terms: Vec<String>,
}

impl Summary {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.main_points.is_empty() && self.topics.is_empty() && self.key_terms.is_empty()
    }
}

//
// ─── QUIZ QUESTION ─────────────────────────────────────────────────────────────
//

/// Multiple-choice question with a 0-based index of the correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

impl QuizQuestion {
    #[must_use]
    pub fn new(
        question: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
        correct_answer: usize,
    ) -> Self {
        Self {
            question: question.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct_answer,
        }
    }

    /// Text of the correct option, or `None` when the index is out of range.
    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }

    /// Whether choosing `option` answers this question correctly.
    ///
    /// A question whose correct index is out of range is never answered correctly.
    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        self.correct_option().is_some() && option == self.correct_answer
    }

    #[must_use]
    pub fn defects(&self) -> Vec<DefectKind> {
        let mut found = Vec::new();
        if self.question.trim().is_empty() {
            found.push(DefectKind::EmptyPrompt);
        }
        if self.options.len() < 2 {
            found.push(DefectKind::TooFewOptions {
                options: self.options.len(),
            });
        }
        if self.correct_answer >= self.options.len() {
            found.push(DefectKind::CorrectAnswerOutOfRange {
                correct_answer: self.correct_answer,
                options: self.options.len(),
            });
        }
        found
    }
}

//
// ─── FLASHCARD ─────────────────────────────────────────────────────────────────
//

/// Two-sided self-assessment card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

impl Flashcard {
    #[must_use]
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }

    #[must_use]
    pub fn defects(&self) -> Vec<DefectKind> {
        let mut found = Vec::new();
        if self.front.trim().is_empty() {
            found.push(DefectKind::MissingFront);
        }
        if self.back.trim().is_empty() {
            found.push(DefectKind::MissingBack);
        }
        found
    }
}

//
// ─── GENERATED CONTENT ─────────────────────────────────────────────────────────
//

/// Everything the analysis backend produces for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub quiz: Vec<QuizQuestion>,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
}

impl GeneratedContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.as_ref().is_none_or(Summary::is_empty)
            && self.quiz.is_empty()
            && self.flashcards.is_empty()
    }

    /// Integrity problems across every question and card, questions first.
    #[must_use]
    pub fn defects(&self, material_id: Option<MaterialId>) -> Vec<ContentDefect> {
        let questions = self.quiz.iter().enumerate().flat_map(|(i, q)| {
            q.defects()
                .into_iter()
                .map(move |kind| ContentDefect::new(material_id, ContentItem::Question(i), kind))
        });
        let cards = self.flashcards.iter().enumerate().flat_map(|(i, c)| {
            c.defects()
                .into_iter()
                .map(move |kind| ContentDefect::new(material_id, ContentItem::Flashcard(i), kind))
        });
        questions.chain(cards).collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_answer_is_never_correct() {
        let q = QuizQuestion::new("2 + 2?", ["3", "4"], 5);
        assert!(q.correct_option().is_none());
        assert!(!q.is_correct(5));
        assert!(!q.is_correct(1));
        assert_eq!(
            q.defects(),
            vec![DefectKind::CorrectAnswerOutOfRange {
                correct_answer: 5,
                options: 2
            }]
        );
    }

    #[test]
    fn well_formed_question_has_no_defects() {
        let q = QuizQuestion::new("Capital of France?", ["Paris", "Rome", "Oslo"], 0);
        assert!(q.defects().is_empty());
        assert!(q.is_correct(0));
        assert_eq!(q.correct_option(), Some("Paris"));
    }

    #[test]
    fn flashcard_without_back_is_defective() {
        let card: Flashcard = serde_json::from_str(r#"{"front":"Mitosis"}"#).unwrap();
        assert_eq!(card.defects(), vec![DefectKind::MissingBack]);
    }

    #[test]
    fn analysis_payload_uses_camel_case_keys() {
        let json = r#"{
            "summary": {"mainPoints": ["a"], "topics": [], "keyTerms": ["b"]},
            "quiz": [{"question": "q", "options": ["x", "y"], "correctAnswer": 1}],
            "flashcards": [{"front": "f", "back": "b"}]
        }"#;
        let content: GeneratedContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.quiz[0].correct_answer, 1);
        assert_eq!(content.summary.unwrap().key_terms, vec!["b".to_string()]);
        assert_eq!(content.flashcards.len(), 1);
    }

    #[test]
    fn content_defects_list_questions_before_cards() {
        let id = MaterialId::generate();
        let content = GeneratedContent {
            summary: None,
            quiz: vec![
                QuizQuestion::new("ok?", ["a", "b"], 0),
                QuizQuestion::new("broken?", ["a", "b"], 5),
            ],
            flashcards: vec![Flashcard::new("", "back")],
        };
        let defects = content.defects(Some(id));
        assert_eq!(defects.len(), 2);
        assert_eq!(defects[0].item, ContentItem::Question(1));
        assert_eq!(defects[1].item, ContentItem::Flashcard(0));
        assert!(defects.iter().all(|d| d.material_id == Some(id)));
    }

    #[test]
    fn empty_summary_counts_as_no_content() {
        let content = GeneratedContent {
            summary: Some(Summary::default()),
            ..GeneratedContent::default()
        };
        assert!(content.is_empty());
    }
}
