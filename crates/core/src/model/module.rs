use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Material, MaterialId, ModuleId, Summary};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("material {material} belongs to another module")]
    ForeignMaterial { material: MaterialId },
}

/// A user-defined collection of materials, kept in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    id: ModuleId,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    materials: Vec<Material>,
}

impl Module {
    /// Creates an empty module. Title and description are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is blank.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ModuleError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ModuleError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            description: description.into().trim().to_string(),
            created_at,
            materials: Vec::new(),
        })
    }

    /// Replaces the materials; their order becomes the presentation order.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::ForeignMaterial` if a material is owned by another module.
    pub fn with_materials(mut self, materials: Vec<Material>) -> Result<Self, ModuleError> {
        if let Some(foreign) = materials.iter().find(|m| m.module_id() != self.id) {
            return Err(ModuleError::ForeignMaterial {
                material: foreign.id(),
            });
        }
        self.materials = materials;
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    #[must_use]
    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.iter().find(|m| m.id() == id)
    }

    /// Total quiz questions across all materials.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.materials.iter().map(|m| m.quiz().len()).sum()
    }

    #[must_use]
    pub fn flashcard_count(&self) -> usize {
        self.materials.iter().map(|m| m.flashcards().len()).sum()
    }

    /// Materials that carry a summary, paired with it, in presentation order.
    pub fn summaries(&self) -> impl Iterator<Item = (&Material, &Summary)> {
        self.materials
            .iter()
            .filter_map(|m| m.summary().map(|summary| (m, summary)))
    }
}
