use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{ContentDefect, ContentItem, Flashcard, Material, MaterialId};

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Which side of the current card is showing, and whether the back has been seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    /// Front, back not seen yet.
    Front,
    Back,
    /// Front again after the back was seen; assessment stays available.
    FrontSeen,
}

impl Face {
    #[must_use]
    pub fn is_flipped(self) -> bool {
        self == Face::Back
    }

    #[must_use]
    pub fn is_revealed(self) -> bool {
        self != Face::Front
    }

    fn flipped(self) -> Self {
        match self {
            Face::Front | Face::FrontSeen => Face::Back,
            Face::Back => Face::FrontSeen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashcardState {
    /// The deck has no cards; terminal.
    Empty,
    Showing { index: usize, face: Face },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassKind {
    /// Every card of the deck, in order.
    Primary,
    /// Only cards marked wrong in the preceding first pass, until each is marked right.
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pass {
    Primary,
    Review { remaining: Vec<usize> },
}

/// One self-assessment, in log order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOutcome {
    pub card_index: usize,
    pub correct: bool,
}

/// Counts for the current pass. `to_review` is only tracked for first passes and
/// matches the cards a review pass would visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub kind: PassKind,
    pub correct: usize,
    pub attempted: usize,
    pub to_review: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlashcardEvent {
    Flipped {
        face: Face,
    },
    Advanced {
        outcome: CardOutcome,
        next_index: usize,
    },
    Completed {
        outcome: CardOutcome,
        summary: PassSummary,
    },
    ReviewStarted {
        cards: Vec<usize>,
    },
    Restarted,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Self-assessment over a flashcard deck: a first pass over every card, then
/// optional review passes that cycle through the missed cards.
///
/// Invalid operations are ignored and return `None`.
pub struct FlashcardSession {
    material_id: Option<MaterialId>,
    cards: Vec<Flashcard>,
    blocked: Vec<bool>,
    defects: Vec<ContentDefect>,
    state: FlashcardState,
    pass: Pass,
    log: Vec<CardOutcome>,
}

impl FlashcardSession {
    #[must_use]
    pub fn new(material_id: Option<MaterialId>, cards: Vec<Flashcard>) -> Self {
        let mut defects = Vec::new();
        let mut blocked = Vec::with_capacity(cards.len());
        for (position, card) in cards.iter().enumerate() {
            let found = card.defects();
            blocked.push(found.iter().any(|kind| kind.blocks_credit()));
            defects.extend(found.into_iter().map(|kind| {
                ContentDefect::new(material_id, ContentItem::Flashcard(position), kind)
            }));
        }
        if !defects.is_empty() {
            tracing::warn!(
                ?material_id,
                defects = defects.len(),
                "deck contains defective flashcards"
            );
        }

        Self {
            material_id,
            state: Self::first_state(cards.len()),
            cards,
            blocked,
            defects,
            pass: Pass::Primary,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn for_material(material: &Material) -> Self {
        Self::new(Some(material.id()), material.flashcards().to_vec())
    }

    fn first_state(len: usize) -> FlashcardState {
        if len == 0 {
            FlashcardState::Empty
        } else {
            FlashcardState::Showing {
                index: 0,
                face: Face::Front,
            }
        }
    }

    #[must_use]
    pub fn material_id(&self) -> Option<MaterialId> {
        self.material_id
    }

    #[must_use]
    pub fn state(&self) -> FlashcardState {
        self.state
    }

    #[must_use]
    pub fn kind(&self) -> PassKind {
        match self.pass {
            Pass::Primary => PassKind::Primary,
            Pass::Review { .. } => PassKind::Review,
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    #[must_use]
    pub fn defects(&self) -> &[ContentDefect] {
        &self.defects
    }

    #[must_use]
    pub fn log(&self) -> &[CardOutcome] {
        &self.log
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == FlashcardState::Completed
    }

    #[must_use]
    pub fn current_card(&self) -> Option<(usize, &Flashcard)> {
        match self.state {
            FlashcardState::Showing { index, .. } => self.cards.get(index).map(|c| (index, c)),
            FlashcardState::Empty | FlashcardState::Completed => None,
        }
    }

    /// Cards still in the review rotation; empty outside review passes.
    #[must_use]
    pub fn review_cards(&self) -> &[usize] {
        match &self.pass {
            Pass::Review { remaining } => remaining,
            Pass::Primary => &[],
        }
    }

    /// One-based position of the current card within the pass, and the pass size.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        let (index, _) = self.current_card()?;
        match &self.pass {
            Pass::Primary => Some((index + 1, self.cards.len())),
            Pass::Review { remaining } => remaining
                .iter()
                .position(|&i| i == index)
                .map(|pos| (pos + 1, remaining.len())),
        }
    }

    #[must_use]
    pub fn summary(&self) -> PassSummary {
        let correct = self.log.iter().filter(|o| o.correct).count();
        let attempted = self.log.len();
        PassSummary {
            kind: self.kind(),
            correct,
            attempted,
            to_review: matches!(self.pass, Pass::Primary).then(|| self.review_set().len()),
        }
    }

    #[must_use]
    pub fn can_assess(&self) -> bool {
        matches!(self.state, FlashcardState::Showing { face, .. } if face.is_revealed())
    }

    #[must_use]
    pub fn can_start_review(&self) -> bool {
        self.is_complete() && matches!(self.pass, Pass::Primary) && !self.review_set().is_empty()
    }

    /// Turns the current card over. The first turn to the back enables assessment.
    pub fn flip(&mut self) -> Option<FlashcardEvent> {
        let FlashcardState::Showing { index, face } = self.state else {
            return None;
        };
        let face = face.flipped();
        self.state = FlashcardState::Showing { index, face };
        Some(FlashcardEvent::Flipped { face })
    }

    /// Records a self-assessment for the current card and moves on.
    ///
    /// Ignored until the back of the card has been seen. A card with missing
    /// text is always logged as incorrect.
    pub fn assess(&mut self, correct: bool) -> Option<FlashcardEvent> {
        let FlashcardState::Showing { index, face } = self.state else {
            return None;
        };
        if !face.is_revealed() {
            return None;
        }

        let correct = correct && !self.blocked.get(index).copied().unwrap_or(true);
        let outcome = CardOutcome {
            card_index: index,
            correct,
        };
        self.log.push(outcome);

        let next = match &mut self.pass {
            Pass::Primary => (index + 1 < self.cards.len()).then_some(index + 1),
            Pass::Review { remaining } => {
                // Step through the rotation as it stood before this card left it.
                let pos = remaining.iter().position(|&i| i == index).unwrap_or(0);
                let candidate = remaining[(pos + 1) % remaining.len()];
                if correct {
                    remaining.retain(|&i| i != index);
                }
                (!remaining.is_empty()).then_some(candidate)
            }
        };

        match next {
            Some(next_index) => {
                self.state = FlashcardState::Showing {
                    index: next_index,
                    face: Face::Front,
                };
                Some(FlashcardEvent::Advanced {
                    outcome,
                    next_index,
                })
            }
            None => {
                self.state = FlashcardState::Completed;
                let summary = self.summary();
                tracing::debug!(
                    material_id = ?self.material_id,
                    kind = ?summary.kind,
                    correct = summary.correct,
                    attempted = summary.attempted,
                    "flashcard pass completed"
                );
                Some(FlashcardEvent::Completed { outcome, summary })
            }
        }
    }

    /// Starts a review pass over every card that has any incorrect entry in
    /// the first-pass log.
    pub fn start_review(&mut self) -> Option<FlashcardEvent> {
        if !self.can_start_review() {
            return None;
        }
        let remaining = self.review_set();
        let first = *remaining.first()?;

        self.log.clear();
        self.pass = Pass::Review {
            remaining: remaining.clone(),
        };
        self.state = FlashcardState::Showing {
            index: first,
            face: Face::Front,
        };
        Some(FlashcardEvent::ReviewStarted { cards: remaining })
    }

    /// Back to the first card of a fresh first pass.
    pub fn reset_deck(&mut self) -> Option<FlashcardEvent> {
        if self.state == FlashcardState::Empty {
            return None;
        }
        self.log.clear();
        self.pass = Pass::Primary;
        self.state = Self::first_state(self.cards.len());
        Some(FlashcardEvent::Restarted)
    }

    // Any incorrect entry counts, even if the same card was later marked right.
    fn review_set(&self) -> Vec<usize> {
        let mut set = Vec::new();
        for outcome in &self.log {
            let blocked = self.blocked.get(outcome.card_index).copied().unwrap_or(true);
            if !outcome.correct && !blocked && !set.contains(&outcome.card_index) {
                set.push(outcome.card_index);
            }
        }
        set
    }
}

impl fmt::Debug for FlashcardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlashcardSession")
            .field("material_id", &self.material_id)
            .field("cards_len", &self.cards.len())
            .field("state", &self.state)
            .field("pass", &self.pass)
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(len: usize) -> FlashcardSession {
        let cards = (0..len)
            .map(|i| Flashcard::new(format!("front {i}"), format!("back {i}")))
            .collect();
        FlashcardSession::new(None, cards)
    }

    fn reveal_and_assess(session: &mut FlashcardSession, correct: bool) -> FlashcardEvent {
        session.flip().unwrap();
        session.assess(correct).unwrap()
    }

    fn current_index(session: &FlashcardSession) -> usize {
        session.current_card().unwrap().0
    }

    #[test]
    fn empty_deck_is_terminal() {
        let mut session = deck(0);
        assert_eq!(session.state(), FlashcardState::Empty);
        assert!(session.flip().is_none());
        assert!(session.assess(true).is_none());
        assert!(session.start_review().is_none());
        assert!(session.reset_deck().is_none());
    }

    #[test]
    fn assess_requires_seeing_the_back() {
        let mut session = deck(2);
        assert!(!session.can_assess());
        assert!(session.assess(true).is_none());
        assert!(session.log().is_empty());
    }

    #[test]
    fn flipping_back_to_front_keeps_assessment_available() {
        let mut session = deck(1);
        assert_eq!(
            session.flip(),
            Some(FlashcardEvent::Flipped { face: Face::Back })
        );
        assert_eq!(
            session.flip(),
            Some(FlashcardEvent::Flipped {
                face: Face::FrontSeen
            })
        );
        let FlashcardState::Showing { face, .. } = session.state() else {
            panic!("expected a card");
        };
        assert!(!face.is_flipped());
        assert!(face.is_revealed());
        assert!(session.can_assess());
    }

    #[test]
    fn primary_pass_walks_deck_in_order() {
        let mut session = deck(3);
        let event = reveal_and_assess(&mut session, true);
        assert_eq!(
            event,
            FlashcardEvent::Advanced {
                outcome: CardOutcome {
                    card_index: 0,
                    correct: true
                },
                next_index: 1
            }
        );
        assert_eq!(
            session.state(),
            FlashcardState::Showing {
                index: 1,
                face: Face::Front
            }
        );
        assert_eq!(session.position(), Some((2, 3)));
    }

    #[test]
    fn primary_summary_and_single_card_review() {
        let mut session = deck(3);
        reveal_and_assess(&mut session, true);
        reveal_and_assess(&mut session, false);
        let FlashcardEvent::Completed { summary, .. } = reveal_and_assess(&mut session, true)
        else {
            panic!("pass should complete");
        };
        assert_eq!(
            summary,
            PassSummary {
                kind: PassKind::Primary,
                correct: 2,
                attempted: 3,
                to_review: Some(1)
            }
        );

        assert!(session.can_start_review());
        assert_eq!(
            session.start_review(),
            Some(FlashcardEvent::ReviewStarted { cards: vec![1] })
        );
        assert_eq!(session.kind(), PassKind::Review);
        assert!(session.log().is_empty());
        assert_eq!(current_index(&session), 1);

        let FlashcardEvent::Completed { summary, .. } = reveal_and_assess(&mut session, true)
        else {
            panic!("review should complete");
        };
        assert_eq!(session.log().len(), 1);
        assert_eq!(summary.to_review, None);
        assert_eq!(summary.correct, 1);
    }

    #[test]
    fn perfect_pass_offers_no_review() {
        let mut session = deck(2);
        reveal_and_assess(&mut session, true);
        reveal_and_assess(&mut session, true);
        assert!(session.is_complete());
        assert!(!session.can_start_review());
        assert!(session.start_review().is_none());
        assert_eq!(session.summary().to_review, Some(0));
    }

    #[test]
    fn review_is_only_offered_after_a_completed_pass() {
        let mut session = deck(2);
        reveal_and_assess(&mut session, false);
        assert!(!session.can_start_review());
        assert!(session.start_review().is_none());
    }

    #[test]
    fn review_cycles_until_every_card_is_right() {
        let mut session = deck(4);
        reveal_and_assess(&mut session, false);
        reveal_and_assess(&mut session, true);
        reveal_and_assess(&mut session, false);
        reveal_and_assess(&mut session, false);
        session.start_review().unwrap();
        assert_eq!(session.review_cards(), &[0, 2, 3]);

        // 0 wrong -> stays, moves to 2
        reveal_and_assess(&mut session, false);
        assert_eq!(current_index(&session), 2);
        // 2 right -> leaves, moves to 3
        reveal_and_assess(&mut session, true);
        assert_eq!(current_index(&session), 3);
        assert_eq!(session.review_cards(), &[0, 3]);
        assert_eq!(session.position(), Some((2, 2)));
        // 3 wrong -> wraps to 0
        reveal_and_assess(&mut session, false);
        assert_eq!(current_index(&session), 0);
        // 0 right -> leaves, moves to 3
        reveal_and_assess(&mut session, true);
        assert_eq!(current_index(&session), 3);
        // 3 right -> rotation empty
        let event = reveal_and_assess(&mut session, true);
        assert!(matches!(event, FlashcardEvent::Completed { .. }));
        assert!(session.is_complete());
        assert_eq!(session.log().len(), 5);
        assert!(!session.can_start_review());
    }

    #[test]
    fn last_card_in_rotation_repeats_until_right() {
        let mut session = deck(1);
        reveal_and_assess(&mut session, false);
        session.start_review().unwrap();

        let event = reveal_and_assess(&mut session, false);
        assert_eq!(
            event,
            FlashcardEvent::Advanced {
                outcome: CardOutcome {
                    card_index: 0,
                    correct: false
                },
                next_index: 0
            }
        );
        assert!(!session.can_assess());
        assert!(matches!(
            reveal_and_assess(&mut session, true),
            FlashcardEvent::Completed { .. }
        ));
    }

    #[test]
    fn review_set_includes_any_card_ever_marked_wrong() {
        let mut session = deck(2);
        reveal_and_assess(&mut session, false);
        reveal_and_assess(&mut session, false);
        session.log.push(CardOutcome {
            card_index: 0,
            correct: true,
        });
        assert_eq!(session.review_set(), vec![0, 1]);
    }

    #[test]
    fn reset_deck_returns_to_first_pass() {
        let mut session = deck(2);
        reveal_and_assess(&mut session, false);
        reveal_and_assess(&mut session, true);
        session.start_review().unwrap();
        assert_eq!(session.reset_deck(), Some(FlashcardEvent::Restarted));
        assert_eq!(session.kind(), PassKind::Primary);
        assert!(session.log().is_empty());
        assert!(session.review_cards().is_empty());
        assert_eq!(
            session.state(),
            FlashcardState::Showing {
                index: 0,
                face: Face::Front
            }
        );
    }

    #[test]
    fn defective_card_is_never_credited_and_skips_review() {
        let cards = vec![Flashcard::new("front", ""), Flashcard::new("ok", "ok")];
        let mut session = FlashcardSession::new(None, cards);
        assert_eq!(session.defects().len(), 1);

        let FlashcardEvent::Advanced { outcome, .. } = reveal_and_assess(&mut session, true) else {
            panic!("expected to advance");
        };
        assert!(!outcome.correct);
        reveal_and_assess(&mut session, true);
        assert_eq!(session.summary().to_review, Some(0));
        assert!(!session.can_start_review());
    }
}
