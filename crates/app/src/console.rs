//! Terminal rendering of notifications.

use study_core::session::{PassKind, QuizScope};
use study_core::{Notification, NotificationSink};

/// Prints every notification to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        if let Some(text) = render(&notification) {
            println!("{text}");
        }
    }
}

/// User-facing text for a notification.
pub fn render(notification: &Notification) -> Option<String> {
    let text = match notification {
        Notification::QuizCompleted { scope, score } => {
            let label = match scope {
                QuizScope::Material(_) => "Quiz",
                QuizScope::Module(_) => "Module Quiz",
            };
            format!(
                "{label} Completed — Score: {:.1}% ({} of {} correct)",
                score.percent(),
                score.correct(),
                score.total()
            )
        }
        Notification::FlashcardsCompleted { summary, .. } => match (summary.kind, summary.to_review) {
            (PassKind::Primary, Some(missed)) if missed > 0 => format!(
                "Flashcards Completed — {} of {} correct, {missed} to review",
                summary.correct, summary.attempted
            ),
            (PassKind::Primary, _) => format!(
                "Flashcards Completed — {} of {} correct",
                summary.correct, summary.attempted
            ),
            (PassKind::Review, _) => format!(
                "Review Completed — every missed card answered correctly ({} attempts)",
                summary.attempted
            ),
        },
        Notification::ContentDefects { defects, .. } => {
            let lines: Vec<String> = defects.iter().map(|d| format!("  - {d}")).collect();
            format!(
                "Warning: {} problem(s) in the generated content\n{}",
                defects.len(),
                lines.join("\n")
            )
        }
        Notification::Succeeded { action } => format!("{action}: done"),
        Notification::Failed { action, reason } => format!("{action} failed: {reason}"),
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{ContentDefect, ContentItem, DefectKind, ModuleId};
    use study_core::session::{PassSummary, QuizScore};

    #[test]
    fn quiz_completion_shows_one_decimal() {
        let text = render(&Notification::QuizCompleted {
            scope: QuizScope::Module(ModuleId::generate()),
            score: QuizScore::from_counts(5, 6),
        })
        .unwrap();
        assert_eq!(text, "Module Quiz Completed — Score: 83.3% (5 of 6 correct)");
    }

    #[test]
    fn primary_pass_mentions_cards_to_review() {
        let text = render(&Notification::FlashcardsCompleted {
            material_id: None,
            summary: PassSummary {
                kind: PassKind::Primary,
                correct: 2,
                attempted: 3,
                to_review: Some(1),
            },
        })
        .unwrap();
        assert_eq!(text, "Flashcards Completed — 2 of 3 correct, 1 to review");
    }

    #[test]
    fn defects_are_listed_one_per_line() {
        let text = render(&Notification::ContentDefects {
            material_id: None,
            defects: vec![ContentDefect::new(
                None,
                ContentItem::Flashcard(0),
                DefectKind::MissingBack,
            )],
        })
        .unwrap();
        assert!(text.ends_with("\n  - flashcard 1: flashcard back is empty"));
        assert_eq!(text.lines().count(), 2);
    }
}
