//! Line-driven quiz and flashcard loops.

use std::io::{self, BufRead, Write};

use services::{CardAction, QuizAction, StudyWorkspace};
use study_core::model::MaterialId;
use study_core::session::{Face, FlashcardState, PassKind, QuizScope, QuizState};

enum Input<A> {
    Action(A),
    Quit,
    Unknown,
}

fn parse_quiz(line: &str) -> Input<QuizAction> {
    match line {
        "q" => Input::Quit,
        "n" => Input::Action(QuizAction::Next),
        "p" => Input::Action(QuizAction::Previous),
        "r" => Input::Action(QuizAction::Reset),
        other => match other.parse::<usize>() {
            Ok(n) if n > 0 => Input::Action(QuizAction::Select(n - 1)),
            _ => Input::Unknown,
        },
    }
}

fn parse_cards(line: &str) -> Input<CardAction> {
    match line {
        "q" => Input::Quit,
        "f" => Input::Action(CardAction::Flip),
        "y" => Input::Action(CardAction::Assess { correct: true }),
        "n" => Input::Action(CardAction::Assess { correct: false }),
        "r" => Input::Action(CardAction::StartReview),
        "x" => Input::Action(CardAction::ResetDeck),
        _ => Input::Unknown,
    }
}

/// Runs a quiz until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if the scope is not part of the workspace or I/O fails.
pub fn run_quiz(
    ws: &mut StudyWorkspace,
    scope: QuizScope,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    ws.open_quiz(scope)?;
    show_quiz(ws, out)?;
    if ws.quiz().is_some_and(|q| q.state() == QuizState::Empty) {
        return Ok(());
    }

    for line in input.lines() {
        let line = line?;
        match parse_quiz(line.trim()) {
            Input::Quit => break,
            Input::Unknown => writeln!(out, "Answer with a number, or n/p/r/q.")?,
            Input::Action(action) => {
                if ws.quiz_action(action).is_none() {
                    writeln!(out, "Not available right now.")?;
                }
            }
        }
        show_quiz(ws, out)?;
    }
    Ok(())
}

fn show_quiz(ws: &StudyWorkspace, out: &mut impl Write) -> io::Result<()> {
    let Some(quiz) = ws.quiz() else {
        return Ok(());
    };
    match quiz.state() {
        QuizState::Empty => writeln!(out, "No quiz questions available yet. Analyze a material first."),
        QuizState::Completed => writeln!(out, "r: restart  q: quit"),
        QuizState::Answering(_) | QuizState::Revealed(_) => {
            let Some(flat) = quiz.current_question() else {
                return Ok(());
            };
            let progress = quiz.progress();
            writeln!(
                out,
                "\nQuestion {} of {} ({})",
                progress.position.unwrap_or(0),
                progress.total,
                flat.material_title
            )?;
            writeln!(out, "{}", flat.question.question)?;
            for (i, option) in flat.question.options.iter().enumerate() {
                let marker = if quiz.feedback().is_some_and(|f| f.chosen == i) {
                    '>'
                } else {
                    ' '
                };
                writeln!(out, "{marker} {}. {option}", i + 1)?;
            }
            if flat.question.options.is_empty() {
                writeln!(out, "This question has no options and counts as incorrect.")?;
            }
            match quiz.feedback() {
                Some(feedback) if feedback.is_correct => writeln!(out, "Correct!")?,
                Some(feedback) => writeln!(
                    out,
                    "Incorrect. The correct answer is: {}",
                    feedback.correct_option.unwrap_or("(not available)")
                )?,
                None => {}
            }
            let mut hints = Vec::new();
            if quiz.can_select() {
                hints.push("1-9: answer");
            }
            if quiz.can_go_next() {
                hints.push("n: next");
            }
            if quiz.can_go_previous() {
                hints.push("p: previous");
            }
            hints.extend(["r: restart", "q: quit"]);
            writeln!(out, "{}", hints.join("  "))
        }
    }
}

/// Runs the flashcard deck of a material until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if the material is not part of the workspace or I/O fails.
pub fn run_flashcards(
    ws: &mut StudyWorkspace,
    material_id: MaterialId,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    ws.open_flashcards(material_id)?;
    show_cards(ws, out)?;
    if ws
        .flashcards()
        .is_some_and(|d| d.state() == FlashcardState::Empty)
    {
        return Ok(());
    }

    for line in input.lines() {
        let line = line?;
        match parse_cards(line.trim()) {
            Input::Quit => break,
            Input::Unknown => writeln!(out, "Use f/y/n/r/x/q.")?,
            Input::Action(action) => {
                if ws.card_action(action).is_none() {
                    writeln!(out, "Not available right now.")?;
                }
            }
        }
        show_cards(ws, out)?;
    }
    Ok(())
}

fn show_cards(ws: &StudyWorkspace, out: &mut impl Write) -> io::Result<()> {
    let Some(deck) = ws.flashcards() else {
        return Ok(());
    };
    match deck.state() {
        FlashcardState::Empty => writeln!(out, "No flashcards available yet. Analyze the material first."),
        FlashcardState::Completed => {
            if deck.can_start_review() {
                writeln!(out, "r: review missed cards  x: start over  q: quit")
            } else {
                writeln!(out, "x: start over  q: quit")
            }
        }
        FlashcardState::Showing { face, .. } => {
            let (Some((_, card)), Some((position, total))) = (deck.current_card(), deck.position())
            else {
                return Ok(());
            };
            let pass = match deck.kind() {
                PassKind::Primary => "Card",
                PassKind::Review => "Review card",
            };
            writeln!(out, "\n{pass} {position} of {total}")?;
            match face {
                Face::Back => writeln!(out, "Back: {}", card.back)?,
                Face::Front | Face::FrontSeen => writeln!(out, "Front: {}", card.front)?,
            }
            if deck.can_assess() {
                writeln!(out, "f: flip  y: I knew it  n: I didn't  x: start over  q: quit")
            } else {
                writeln!(out, "f: flip  x: start over  q: quit")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use study_core::model::{Flashcard, GeneratedContent, Material, Module, ModuleId, QuizQuestion};
    use study_core::time::fixed_now;
    use study_core::{Notification, NotificationSink, RecordingSink};

    fn workspace() -> (StudyWorkspace, MaterialId, Arc<RecordingSink>) {
        let module = Module::new(ModuleId::generate(), "Geo", "", fixed_now()).unwrap();
        let material = Material::new(MaterialId::generate(), module.id(), "Capitals", "pdf", fixed_now())
            .unwrap()
            .with_content(GeneratedContent {
                summary: None,
                quiz: vec![
                    QuizQuestion::new("France?", ["Paris", "Lyon"], 0),
                    QuizQuestion::new("Italy?", ["Milan", "Rome"], 1),
                ],
                flashcards: vec![Flashcard::new("Spain", "Madrid"), Flashcard::new("Peru", "Lima")],
            });
        let id = material.id();
        let module = module.with_materials(vec![material]).unwrap();
        let sink = Arc::new(RecordingSink::new());
        let ws = StudyWorkspace::new(module, Arc::clone(&sink) as Arc<dyn NotificationSink>);
        (ws, id, sink)
    }

    #[test]
    fn quiz_loop_scores_and_reports_completion() {
        let (mut ws, id, sink) = workspace();
        let mut out = Vec::new();
        let input = Cursor::new("1\nn\n1\nn\nq\n");

        run_quiz(&mut ws, QuizScope::Material(id), input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Question 1 of 2 (Capitals)"));
        assert!(text.contains("Incorrect. The correct answer is: Rome"));
        match sink.received().as_slice() {
            [Notification::QuizCompleted { score, .. }] => assert_eq!(score.correct(), 1),
            other => panic!("unexpected notifications: {other:?}"),
        }
    }

    #[test]
    fn quiz_loop_rejects_moves_that_are_not_allowed() {
        let (mut ws, id, _) = workspace();
        let mut out = Vec::new();

        run_quiz(&mut ws, QuizScope::Material(id), Cursor::new("p\nn\nzz\n"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Not available right now.").count(), 2);
        assert!(text.contains("Answer with a number"));
    }

    #[test]
    fn flashcard_loop_runs_primary_and_review_passes() {
        let (mut ws, id, sink) = workspace();
        let mut out = Vec::new();
        let input = Cursor::new("f\ny\nf\nn\nr\nf\ny\nq\n");

        run_flashcards(&mut ws, id, input, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Back: Madrid"));
        assert!(text.contains("Review card 1 of 1"));
        assert_eq!(sink.received().len(), 2);
        assert!(ws.flashcards().unwrap().is_complete());
    }
}
