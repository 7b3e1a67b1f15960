use std::fmt;

use crate::model::{ContentDefect, Material, Module};
use crate::session::flatten::{self, FlatQuestion, QuizScope};
use crate::session::scoring::QuizScore;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a quiz session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    /// Nothing to ask; terminal.
    Empty,
    /// Waiting for an answer to question `i`.
    Answering(usize),
    /// Question `i` has a locked answer and its feedback is visible.
    Revealed(usize),
    Completed,
}

/// Something that happened as the result of an accepted operation.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    Answered {
        index: usize,
        option: usize,
        correct: bool,
    },
    Moved {
        index: usize,
    },
    Completed(QuizScore),
    Restarted,
}

/// Feedback for a question that has a locked answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback<'a> {
    pub chosen: usize,
    pub is_correct: bool,
    /// `None` when the question's correct index is out of range.
    pub correct_option: Option<&'a str>,
}

/// Counters for a "Question x of y" style header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub position: Option<usize>,
    pub total: usize,
    pub answered: usize,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Linear walk through a flattened question list with locked answers.
///
/// The same component serves a single material and a whole module; only the
/// question list it is given differs. Operations that are not valid in the
/// current state are ignored and return `None`.
pub struct QuizSession {
    scope: QuizScope,
    questions: Vec<FlatQuestion>,
    answers: Vec<Option<usize>>,
    state: QuizState,
    defects: Vec<ContentDefect>,
}

impl QuizSession {
    #[must_use]
    pub fn new(scope: QuizScope, questions: Vec<FlatQuestion>) -> Self {
        let defects = flatten::question_defects(&questions);
        if !defects.is_empty() {
            tracing::warn!(
                ?scope,
                defects = defects.len(),
                "quiz contains defective questions"
            );
        }
        let state = if questions.is_empty() {
            QuizState::Empty
        } else {
            QuizState::Answering(0)
        };

        Self {
            scope,
            answers: vec![None; questions.len()],
            questions,
            state,
            defects,
        }
    }

    #[must_use]
    pub fn for_material(material: &Material) -> Self {
        Self::new(
            QuizScope::Material(material.id()),
            flatten::flatten_material(material),
        )
    }

    #[must_use]
    pub fn for_module(module: &Module) -> Self {
        Self::new(QuizScope::Module(module.id()), flatten::flatten_module(module))
    }

    #[must_use]
    pub fn scope(&self) -> QuizScope {
        self.scope
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn questions(&self) -> &[FlatQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == QuizState::Completed
    }

    /// Defects found in the question list when the session was built.
    #[must_use]
    pub fn defects(&self) -> &[ContentDefect] {
        &self.defects
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            QuizState::Answering(i) | QuizState::Revealed(i) => Some(i),
            QuizState::Empty | QuizState::Completed => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&FlatQuestion> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<usize> {
        self.answers.get(index).copied().flatten()
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    /// Feedback for the current question, once its answer is revealed.
    #[must_use]
    pub fn feedback(&self) -> Option<AnswerFeedback<'_>> {
        let QuizState::Revealed(i) = self.state else {
            return None;
        };
        let chosen = self.answer(i)?;
        let question = &self.questions.get(i)?.question;
        Some(AnswerFeedback {
            chosen,
            is_correct: question.is_correct(chosen),
            correct_option: question.correct_option(),
        })
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            position: self.current_index().map(|i| i + 1),
            total: self.questions.len(),
            answered: self.answers.iter().filter(|a| a.is_some()).count(),
        }
    }

    #[must_use]
    pub fn can_select(&self) -> bool {
        matches!(self.state, QuizState::Answering(i) if !self.has_no_options(i))
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        match self.state {
            QuizState::Revealed(_) => true,
            QuizState::Answering(i) => self.has_no_options(i),
            QuizState::Empty | QuizState::Completed => false,
        }
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.current_index().is_some_and(|i| i > 0)
    }

    /// Score over the answers recorded so far.
    #[must_use]
    pub fn score(&self) -> QuizScore {
        QuizScore::compute(&self.questions, &self.answers)
    }

    /// Score of a finished session.
    #[must_use]
    pub fn final_score(&self) -> Option<QuizScore> {
        self.is_complete().then(|| self.score())
    }

    /// Locks `option` as the answer to the current question and reveals feedback.
    ///
    /// Ignored once the answer is revealed, and for out-of-range options.
    pub fn select_answer(&mut self, option: usize) -> Option<QuizEvent> {
        let QuizState::Answering(index) = self.state else {
            return None;
        };
        let question = &self.questions.get(index)?.question;
        if option >= question.options.len() {
            return None;
        }
        let correct = question.is_correct(option);

        self.answers[index] = Some(option);
        self.state = QuizState::Revealed(index);
        Some(QuizEvent::Answered {
            index,
            option,
            correct,
        })
    }

    /// Advances past a revealed question, completing the quiz after the last one.
    ///
    /// A question without options cannot be answered; it is skipped unanswered
    /// and scores as incorrect.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<QuizEvent> {
        let index = match self.state {
            QuizState::Revealed(i) => i,
            QuizState::Answering(i) if self.has_no_options(i) => i,
            _ => return None,
        };

        if index + 1 >= self.questions.len() {
            self.state = QuizState::Completed;
            let score = self.score();
            tracing::debug!(
                scope = ?self.scope,
                correct = score.correct(),
                total = score.total(),
                "quiz completed"
            );
            return Some(QuizEvent::Completed(score));
        }

        let index = index + 1;
        self.state = self.landing_state(index);
        Some(QuizEvent::Moved { index })
    }

    /// Steps back one question; an already-answered question stays locked.
    pub fn previous(&mut self) -> Option<QuizEvent> {
        let index = self.current_index().filter(|&i| i > 0)? - 1;
        self.state = self.landing_state(index);
        Some(QuizEvent::Moved { index })
    }

    /// Clears every answer and starts again from the first question.
    pub fn reset(&mut self) -> Option<QuizEvent> {
        if self.state == QuizState::Empty {
            return None;
        }
        self.answers.iter_mut().for_each(|a| *a = None);
        self.state = QuizState::Answering(0);
        Some(QuizEvent::Restarted)
    }

    fn has_no_options(&self, index: usize) -> bool {
        self.questions
            .get(index)
            .is_some_and(|q| q.question.options.is_empty())
    }

    fn landing_state(&self, index: usize) -> QuizState {
        if self.answer(index).is_some() {
            QuizState::Revealed(index)
        } else {
            QuizState::Answering(index)
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("scope", &self.scope)
            .field("questions_len", &self.questions.len())
            .field("state", &self.state)
            .field("defects_len", &self.defects.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
