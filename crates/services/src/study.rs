//! Study workflow: loads a module snapshot and drives one session at a time.

use std::sync::Arc;

use storage::repository::ModuleRepository;
use study_core::model::{MaterialId, Module, ModuleId};
use study_core::session::{FlashcardEvent, FlashcardSession, QuizEvent, QuizScope, QuizSession};
use study_core::{Notification, NotificationSink};

use crate::error::StudyError;

/// A user action on the active quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Select(usize),
    Next,
    Previous,
    Reset,
}

/// A user action on the active flashcard deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Flip,
    Assess { correct: bool },
    StartReview,
    ResetDeck,
}

enum ActiveSession {
    Quiz(QuizSession),
    Flashcards(FlashcardSession),
}

/// Loads modules for study.
#[derive(Clone)]
pub struct StudyService {
    modules: Arc<dyn ModuleRepository>,
    sink: Arc<dyn NotificationSink>,
}

impl StudyService {
    #[must_use]
    pub fn new(modules: Arc<dyn ModuleRepository>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { modules, sink }
    }

    /// Load a module snapshot into a fresh workspace with no active session.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::ModuleNotFound` if the module is missing.
    /// Returns `StudyError::Storage` if repository access fails.
    pub async fn open(&self, module_id: ModuleId) -> Result<StudyWorkspace, StudyError> {
        let module = self
            .modules
            .get_module(module_id)
            .await?
            .ok_or(StudyError::ModuleNotFound(module_id))?;
        tracing::debug!(
            %module_id,
            materials = module.materials().len(),
            questions = module.question_count(),
            "opened module for study"
        );
        Ok(StudyWorkspace::new(module, Arc::clone(&self.sink)))
    }

    /// Reload the workspace's module, discarding any active session.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::ModuleNotFound` if the module was deleted meanwhile.
    /// Returns `StudyError::Storage` if repository access fails.
    pub async fn refresh(&self, workspace: &mut StudyWorkspace) -> Result<(), StudyError> {
        let module_id = workspace.module.id();
        let module = self
            .modules
            .get_module(module_id)
            .await?
            .ok_or(StudyError::ModuleNotFound(module_id))?;
        workspace.module = module;
        workspace.close();
        Ok(())
    }
}

/// One module snapshot and at most one active session built from it.
///
/// Opening a session for a different scope or mode discards the previous one;
/// answers never carry over between flattenings.
pub struct StudyWorkspace {
    module: Module,
    sink: Arc<dyn NotificationSink>,
    active: Option<ActiveSession>,
}

impl StudyWorkspace {
    #[must_use]
    pub fn new(module: Module, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            module,
            sink,
            active: None,
        }
    }

    #[must_use]
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn close(&mut self) {
        self.active = None;
    }

    /// Start or resume the quiz for `scope`.
    ///
    /// The running quiz is kept when it already has this scope; anything else
    /// is replaced by a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::MaterialNotFound` or `StudyError::ForeignModule`
    /// when the scope does not belong to the loaded module.
    pub fn open_quiz(&mut self, scope: QuizScope) -> Result<&QuizSession, StudyError> {
        let reuse = matches!(&self.active, Some(ActiveSession::Quiz(quiz)) if quiz.scope() == scope);
        if !reuse {
            let session = match scope {
                QuizScope::Material(id) => {
                    let material = self
                        .module
                        .material(id)
                        .ok_or(StudyError::MaterialNotFound(id))?;
                    QuizSession::for_material(material)
                }
                QuizScope::Module(id) if id == self.module.id() => {
                    QuizSession::for_module(&self.module)
                }
                QuizScope::Module(id) => return Err(StudyError::ForeignModule(id)),
            };
            self.report_defects(session.defects().to_vec(), scope_material(scope));
            self.active = Some(ActiveSession::Quiz(session));
        }
        self.quiz().ok_or(StudyError::ModuleNotFound(self.module.id()))
    }

    /// Start or resume the flashcard deck of a material.
    ///
    /// # Errors
    ///
    /// Returns `StudyError::MaterialNotFound` if the material is not part of
    /// the loaded module.
    pub fn open_flashcards(&mut self, id: MaterialId) -> Result<&FlashcardSession, StudyError> {
        let reuse = matches!(
            &self.active,
            Some(ActiveSession::Flashcards(deck)) if deck.material_id() == Some(id)
        );
        if !reuse {
            let material = self
                .module
                .material(id)
                .ok_or(StudyError::MaterialNotFound(id))?;
            let session = FlashcardSession::for_material(material);
            self.report_defects(session.defects().to_vec(), Some(id));
            self.active = Some(ActiveSession::Flashcards(session));
        }
        self.flashcards().ok_or(StudyError::MaterialNotFound(id))
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&QuizSession> {
        match &self.active {
            Some(ActiveSession::Quiz(quiz)) => Some(quiz),
            _ => None,
        }
    }

    #[must_use]
    pub fn flashcards(&self) -> Option<&FlashcardSession> {
        match &self.active {
            Some(ActiveSession::Flashcards(deck)) => Some(deck),
            _ => None,
        }
    }

    /// Apply an action to the active quiz. Completion is forwarded to the sink.
    ///
    /// Returns `None` when no quiz is active or the action was not accepted.
    pub fn quiz_action(&mut self, action: QuizAction) -> Option<QuizEvent> {
        let Some(ActiveSession::Quiz(quiz)) = &mut self.active else {
            return None;
        };
        let event = match action {
            QuizAction::Select(option) => quiz.select_answer(option),
            QuizAction::Next => quiz.next(),
            QuizAction::Previous => quiz.previous(),
            QuizAction::Reset => quiz.reset(),
        }?;
        if let QuizEvent::Completed(score) = &event {
            self.sink.notify(Notification::QuizCompleted {
                scope: quiz.scope(),
                score: *score,
            });
        }
        Some(event)
    }

    /// Apply an action to the active flashcard deck. Pass completion is
    /// forwarded to the sink.
    ///
    /// Returns `None` when no deck is active or the action was not accepted.
    pub fn card_action(&mut self, action: CardAction) -> Option<FlashcardEvent> {
        let Some(ActiveSession::Flashcards(deck)) = &mut self.active else {
            return None;
        };
        let event = match action {
            CardAction::Flip => deck.flip(),
            CardAction::Assess { correct } => deck.assess(correct),
            CardAction::StartReview => deck.start_review(),
            CardAction::ResetDeck => deck.reset_deck(),
        }?;
        if let FlashcardEvent::Completed { summary, .. } = &event {
            self.sink.notify(Notification::FlashcardsCompleted {
                material_id: deck.material_id(),
                summary: *summary,
            });
        }
        Some(event)
    }

    fn report_defects(
        &self,
        defects: Vec<study_core::model::ContentDefect>,
        material_id: Option<MaterialId>,
    ) {
        if defects.is_empty() {
            return;
        }
        self.sink.notify(Notification::ContentDefects {
            material_id,
            defects,
        });
    }
}

fn scope_material(scope: QuizScope) -> Option<MaterialId> {
    match scope {
        QuizScope::Material(id) => Some(id),
        QuizScope::Module(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use study_core::RecordingSink;
    use study_core::model::{Flashcard, GeneratedContent, Material, QuizQuestion};
    use study_core::session::QuizState;
    use study_core::time::fixed_now;

    fn module_with(quiz_sizes: &[usize]) -> Module {
        let module = Module::new(ModuleId::generate(), "Physics", "", fixed_now()).unwrap();
        let materials = quiz_sizes
            .iter()
            .enumerate()
            .map(|(m, &n)| {
                let quiz = (0..n)
                    .map(|i| QuizQuestion::new(format!("M{m}Q{i}"), ["a", "b"], 0))
                    .collect();
                Material::new(
                    MaterialId::generate(),
                    module.id(),
                    format!("Material {m}"),
                    "pdf",
                    fixed_now(),
                )
                .unwrap()
                .with_content(GeneratedContent {
                    summary: None,
                    quiz,
                    flashcards: vec![Flashcard::new("F", "B")],
                })
            })
            .collect();
        module.with_materials(materials).unwrap()
    }

    #[test]
    fn switching_scope_rebuilds_the_quiz() {
        let module = module_with(&[2, 1]);
        let first = module.materials()[0].id();
        let sink = Arc::new(RecordingSink::new());
        let mut ws = StudyWorkspace::new(module.clone(), sink);

        ws.open_quiz(QuizScope::Material(first)).unwrap();
        ws.quiz_action(QuizAction::Select(0)).unwrap();
        assert_eq!(ws.quiz().unwrap().answer(0), Some(0));

        // Same scope keeps the running session.
        ws.open_quiz(QuizScope::Material(first)).unwrap();
        assert_eq!(ws.quiz().unwrap().answer(0), Some(0));

        let quiz = ws.open_quiz(QuizScope::Module(module.id())).unwrap();
        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz.answer(0), None);
        assert_eq!(quiz.state(), QuizState::Answering(0));
    }

    #[test]
    fn opening_flashcards_discards_the_quiz() {
        let module = module_with(&[1]);
        let id = module.materials()[0].id();
        let mut ws = StudyWorkspace::new(module, Arc::new(RecordingSink::new()));

        ws.open_quiz(QuizScope::Material(id)).unwrap();
        ws.open_flashcards(id).unwrap();
        assert!(ws.quiz().is_none());
        assert!(ws.quiz_action(QuizAction::Next).is_none());
        assert!(ws.card_action(CardAction::Flip).is_some());
    }

    #[test]
    fn completion_is_forwarded_to_sink() {
        let module = module_with(&[2]);
        let sink = Arc::new(RecordingSink::new());
        let mut ws = StudyWorkspace::new(module.clone(), Arc::clone(&sink) as Arc<dyn NotificationSink>);

        ws.open_quiz(QuizScope::Module(module.id())).unwrap();
        ws.quiz_action(QuizAction::Select(0)).unwrap();
        ws.quiz_action(QuizAction::Next).unwrap();
        ws.quiz_action(QuizAction::Select(1)).unwrap();
        let event = ws.quiz_action(QuizAction::Next).unwrap();
        assert!(matches!(event, QuizEvent::Completed(_)));

        let received = sink.received();
        assert_eq!(received.len(), 1);
        match &received[0] {
            Notification::QuizCompleted { scope, score } => {
                assert_eq!(*scope, QuizScope::Module(module.id()));
                assert_eq!(score.correct(), 1);
                assert!((score.percent() - 50.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[test]
    fn scopes_outside_the_module_are_rejected() {
        let module = module_with(&[1]);
        let mut ws = StudyWorkspace::new(module, Arc::new(RecordingSink::new()));
        assert!(matches!(
            ws.open_quiz(QuizScope::Module(ModuleId::generate())),
            Err(StudyError::ForeignModule(_))
        ));
        assert!(matches!(
            ws.open_flashcards(MaterialId::generate()),
            Err(StudyError::MaterialNotFound(_))
        ));
    }

    #[tokio::test]
    async fn refresh_reloads_module_and_closes_session() {
        let repo = storage::repository::InMemoryRepository::new();
        let module = module_with(&[1]);
        repo.upsert_module(&module).await.unwrap();
        let service = StudyService::new(Arc::new(repo.clone()), Arc::new(RecordingSink::new()));

        let mut ws = service.open(module.id()).await.unwrap();
        assert!(ws.module().materials().is_empty());
        ws.open_quiz(QuizScope::Module(module.id())).unwrap();

        let material = module.materials()[0].clone();
        storage::repository::MaterialRepository::append_material(&repo, &material)
            .await
            .unwrap();
        service.refresh(&mut ws).await.unwrap();

        assert_eq!(ws.module().question_count(), 1);
        assert!(ws.quiz().is_none());
        assert!(ws.quiz_action(QuizAction::Next).is_none());

        repo.delete_module(module.id()).await.unwrap();
        assert!(matches!(
            service.refresh(&mut ws).await,
            Err(StudyError::ModuleNotFound(id)) if id == module.id()
        ));
    }
}
