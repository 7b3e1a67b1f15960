use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{Flashcard, GeneratedContent, MaterialId, ModuleId, QuizQuestion, Summary};

/// Type tag used when an uploaded file name has no extension.
pub const DEFAULT_MATERIAL_KIND: &str = "PDF";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MaterialError {
    #[error("material title cannot be empty")]
    EmptyTitle,

    #[error("material type cannot be empty")]
    EmptyKind,

    #[error("stored file path cannot be empty")]
    EmptyFilePath,
}

//
// ─── STORED FILE ───────────────────────────────────────────────────────────────
//

/// Location of the uploaded document backing a material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    path: String,
    url: Url,
}

impl StoredFile {
    /// # Errors
    ///
    /// Returns `MaterialError::EmptyFilePath` if `path` is blank.
    pub fn new(path: impl Into<String>, url: Url) -> Result<Self, MaterialError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(MaterialError::EmptyFilePath);
        }
        Ok(Self { path, url })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Splits an uploaded file name into a material title and an upper-cased type tag.
///
/// `"Lecture 3.pdf"` becomes `("Lecture 3", "PDF")`; a name without an
/// extension keeps its full text as title and falls back to [`DEFAULT_MATERIAL_KIND`].
#[must_use]
pub fn title_and_kind_from_file_name(file_name: &str) -> (String, String) {
    let path = Path::new(file_name);
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string();
    let kind = path
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| DEFAULT_MATERIAL_KIND.to_string(), str::to_uppercase);
    (title, kind)
}

//
// ─── MATERIAL ──────────────────────────────────────────────────────────────────
//

/// An uploaded document together with whatever study content was generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    id: MaterialId,
    module_id: ModuleId,
    title: String,
    kind: String,
    created_at: DateTime<Utc>,
    file: Option<StoredFile>,
    content: GeneratedContent,
}

impl Material {
    /// Creates a material with no generated content yet.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::EmptyTitle` or `MaterialError::EmptyKind` for blank fields.
    pub fn new(
        id: MaterialId,
        module_id: ModuleId,
        title: impl Into<String>,
        kind: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, MaterialError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(MaterialError::EmptyTitle);
        }
        let kind = kind.into().trim().to_uppercase();
        if kind.is_empty() {
            return Err(MaterialError::EmptyKind);
        }

        Ok(Self {
            id,
            module_id,
            title,
            kind,
            created_at,
            file: None,
            content: GeneratedContent::default(),
        })
    }

    #[must_use]
    pub fn with_file(mut self, file: StoredFile) -> Self {
        self.file = Some(file);
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: GeneratedContent) -> Self {
        self.content = content;
        self
    }

    pub fn set_content(&mut self, content: GeneratedContent) {
        self.content = content;
    }

    #[must_use]
    pub fn id(&self) -> MaterialId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Upper-cased document type tag, e.g. `PDF`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn file(&self) -> Option<&StoredFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &GeneratedContent {
        &self.content
    }

    #[must_use]
    pub fn summary(&self) -> Option<&Summary> {
        self.content.summary.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.content.quiz
    }

    #[must_use]
    pub fn flashcards(&self) -> &[Flashcard] {
        &self.content.flashcards
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn file_name_splits_into_title_and_kind() {
        assert_eq!(
            title_and_kind_from_file_name("Lecture 3.pdf"),
            ("Lecture 3".to_string(), "PDF".to_string())
        );
        assert_eq!(
            title_and_kind_from_file_name("week.two.docx"),
            ("week.two".to_string(), "DOCX".to_string())
        );
        assert_eq!(
            title_and_kind_from_file_name("notes"),
            ("notes".to_string(), "PDF".to_string())
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = Material::new(
            MaterialId::generate(),
            ModuleId::generate(),
            "   ",
            "pdf",
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, MaterialError::EmptyTitle);
    }

    #[test]
    fn new_material_has_no_generated_content() {
        let material = Material::new(
            MaterialId::generate(),
            ModuleId::generate(),
            " Cells ",
            "pdf",
            fixed_now(),
        )
        .unwrap();
        assert_eq!(material.title(), "Cells");
        assert_eq!(material.kind(), "PDF");
        assert!(!material.has_content());
        assert!(material.summary().is_none());
        assert!(material.quiz().is_empty());
        assert!(material.flashcards().is_empty());
    }

    #[test]
    fn stored_file_requires_path() {
        let url = Url::parse("file:///tmp/x.pdf").unwrap();
        assert_eq!(
            StoredFile::new(" ", url).unwrap_err(),
            MaterialError::EmptyFilePath
        );
    }
}
