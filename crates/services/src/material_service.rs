use std::sync::Arc;

use storage::repository::{MaterialRepository, ModuleRepository, StorageError};
use study_core::model::{Material, MaterialId, ModuleId, title_and_kind_from_file_name};

use crate::Clock;
use crate::error::MaterialServiceError;
use crate::uploads::FileStore;

/// Orchestrates uploads and removal of materials.
#[derive(Clone)]
pub struct MaterialService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    materials: Arc<dyn MaterialRepository>,
    files: Arc<dyn FileStore>,
}

impl MaterialService {
    #[must_use]
    pub fn new(
        clock: Clock,
        modules: Arc<dyn ModuleRepository>,
        materials: Arc<dyn MaterialRepository>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            clock,
            modules,
            materials,
            files,
        }
    }

    /// Store an uploaded document and append it to the module as a new material.
    ///
    /// The title is the file name without its extension; the type tag is the
    /// upper-cased extension.
    ///
    /// # Errors
    ///
    /// Returns `MaterialServiceError::ModuleNotFound` if the module is missing,
    /// `MaterialServiceError::FileStore` if the upload cannot be written and
    /// `MaterialServiceError::Storage` if persistence fails.
    pub async fn upload(
        &self,
        module_id: ModuleId,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Material, MaterialServiceError> {
        if self.modules.get_module(module_id).await?.is_none() {
            return Err(MaterialServiceError::ModuleNotFound(module_id));
        }

        let (title, kind) = title_and_kind_from_file_name(file_name);
        let material = Material::new(
            MaterialId::generate(),
            module_id,
            title,
            kind,
            self.clock.now(),
        )?;
        let stored = self.files.store(module_id, file_name, bytes).await?;
        let material = material.with_file(stored);

        if let Err(err) = self.materials.append_material(&material).await {
            if let Some(file) = material.file() {
                if let Err(cleanup) = self.files.delete(file.path()).await {
                    tracing::warn!(path = file.path(), err = %cleanup, "failed to remove orphaned upload");
                }
            }
            return Err(match err {
                StorageError::NotFound => MaterialServiceError::ModuleNotFound(module_id),
                other => other.into(),
            });
        }

        tracing::info!(
            %module_id,
            material_id = %material.id(),
            kind = material.kind(),
            size = bytes.len(),
            "uploaded material"
        );
        Ok(material)
    }

    /// Fetch a material by ID.
    ///
    /// # Errors
    ///
    /// Returns `MaterialServiceError::Storage` if repository access fails.
    pub async fn get_material(
        &self,
        id: MaterialId,
    ) -> Result<Option<Material>, MaterialServiceError> {
        Ok(self.materials.get_material(id).await?)
    }

    /// Delete a material and its stored file.
    ///
    /// A stored file that cannot be removed is logged and left behind.
    ///
    /// # Errors
    ///
    /// Returns `MaterialServiceError::NotFound` if the material does not exist.
    /// Returns `MaterialServiceError::Storage` if repository access fails.
    pub async fn delete_material(&self, id: MaterialId) -> Result<(), MaterialServiceError> {
        let material = self
            .materials
            .get_material(id)
            .await?
            .ok_or(MaterialServiceError::NotFound(id))?;

        match self.materials.delete_material(id).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(MaterialServiceError::NotFound(id)),
            Err(err) => return Err(err.into()),
        }

        if let Some(file) = material.file() {
            if let Err(err) = self.files.delete(file.path()).await {
                tracing::warn!(material_id = %id, path = file.path(), %err, "failed to remove stored file");
            }
        }
        tracing::info!(material_id = %id, module_id = %material.module_id(), "deleted material");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use storage::repository::InMemoryRepository;
    use study_core::model::{Flashcard, GeneratedContent, Module, QuizQuestion};
    use study_core::time::fixed_now;

    use crate::uploads::LocalFileStore;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: std::path::PathBuf,
        repo: InMemoryRepository,
        service: MaterialService,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let repo = InMemoryRepository::new();
        let files = LocalFileStore::with_file_urls(&root).unwrap();
        let service = MaterialService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(files),
        );
        Fixture {
            _dir: dir,
            root,
            repo,
            service,
        }
    }

    async fn module(repo: &InMemoryRepository) -> Module {
        let module = Module::new(ModuleId::generate(), "Biology", "", fixed_now()).unwrap();
        repo.upsert_module(&module).await.unwrap();
        module
    }

    #[tokio::test]
    async fn upload_derives_title_and_kind_and_stores_file() {
        let fx = fixture();
        let module = module(&fx.repo).await;

        let material = fx
            .service
            .upload(module.id(), "Cell Division.pdf", b"%PDF")
            .await
            .unwrap();

        assert_eq!(material.title(), "Cell Division");
        assert_eq!(material.kind(), "PDF");
        assert!(!material.has_content());
        let file = material.file().unwrap();
        assert!(fx.root.join(file.path()).exists());

        let fetched = fx.repo.get_module(module.id()).await.unwrap().unwrap();
        assert_eq!(fetched.materials(), std::slice::from_ref(&material));
    }

    #[tokio::test]
    async fn upload_to_missing_module_fails_without_writing() {
        let fx = fixture();
        let missing = ModuleId::generate();
        let err = fx
            .service
            .upload(missing, "notes.txt", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, MaterialServiceError::ModuleNotFound(id) if id == missing));
        assert!(!fx.root.join("modules").exists());
    }

    #[tokio::test]
    async fn analysed_material_delete_removes_file() {
        let fx = fixture();
        let module = module(&fx.repo).await;
        let material = fx
            .service
            .upload(module.id(), "slides.pptx", b"deck")
            .await
            .unwrap();

        let content = GeneratedContent {
            summary: None,
            quiz: vec![QuizQuestion::new("2+2?", ["3", "4"], 1)],
            flashcards: vec![Flashcard::new("Cell", "Unit of life")],
        };
        fx.repo
            .update_content(material.id(), &content)
            .await
            .unwrap();
        let fetched = fx
            .service
            .get_material(material.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.quiz().len(), 1);

        fx.service.delete_material(material.id()).await.unwrap();
        let path = fx.root.join(material.file().unwrap().path());
        assert!(!path.exists());
        assert!(matches!(
            fx.service.delete_material(material.id()).await.unwrap_err(),
            MaterialServiceError::NotFound(_)
        ));
    }
}
