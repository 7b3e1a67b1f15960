use serde::{Deserialize, Serialize};

use crate::model::{ContentDefect, ContentItem, Material, MaterialId, Module, ModuleId, QuizQuestion};

/// What a quiz session was built from. Sessions are never reused across scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizScope {
    Material(MaterialId),
    Module(ModuleId),
}

/// A question at its position in a flattened, session-wide order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatQuestion {
    pub material_id: MaterialId,
    pub material_title: String,
    /// Position of the question inside its own material.
    pub index_in_material: usize,
    pub question: QuizQuestion,
}

/// Questions of a single material, in their stored order.
#[must_use]
pub fn flatten_material(material: &Material) -> Vec<FlatQuestion> {
    material
        .quiz()
        .iter()
        .enumerate()
        .map(|(index_in_material, question)| FlatQuestion {
            material_id: material.id(),
            material_title: material.title().to_string(),
            index_in_material,
            question: question.clone(),
        })
        .collect()
}

/// Questions of every material in the module: material order first, then question order.
#[must_use]
pub fn flatten_module(module: &Module) -> Vec<FlatQuestion> {
    module.materials().iter().flat_map(flatten_material).collect()
}

pub(crate) fn question_defects(questions: &[FlatQuestion]) -> Vec<ContentDefect> {
    questions
        .iter()
        .enumerate()
        .flat_map(|(position, flat)| {
            flat.question.defects().into_iter().map(move |kind| {
                ContentDefect::new(Some(flat.material_id), ContentItem::Question(position), kind)
            })
        })
        .collect()
}
