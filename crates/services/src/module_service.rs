use std::sync::Arc;

use storage::repository::{ModuleRepository, StorageError};
use study_core::model::{Module, ModuleId};

use crate::Clock;
use crate::error::ModuleServiceError;
use crate::uploads::FileStore;

/// Orchestrates module creation, listing and removal.
#[derive(Clone)]
pub struct ModuleService {
    clock: Clock,
    modules: Arc<dyn ModuleRepository>,
    files: Arc<dyn FileStore>,
}

impl ModuleService {
    #[must_use]
    pub fn new(
        clock: Clock,
        modules: Arc<dyn ModuleRepository>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            clock,
            modules,
            files,
        }
    }

    /// Create and persist an empty module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::Module` for a blank title.
    /// Returns `ModuleServiceError::Storage` if persistence fails.
    pub async fn create_module(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Module, ModuleServiceError> {
        let module = Module::new(ModuleId::generate(), title, description, self.clock.now())?;
        self.modules.upsert_module(&module).await?;
        tracing::info!(module_id = %module.id(), title = module.title(), "created module");
        Ok(module)
    }

    /// List modules, oldest first, each with its materials.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::Storage` if repository access fails.
    pub async fn list_modules(&self) -> Result<Vec<Module>, ModuleServiceError> {
        Ok(self.modules.list_modules().await?)
    }

    /// Fetch a module by ID.
    ///
    /// Returns `Ok(None)` when the module does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::Storage` if repository access fails.
    pub async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, ModuleServiceError> {
        Ok(self.modules.get_module(id).await?)
    }

    /// Delete a module, its materials and their stored files.
    ///
    /// A stored file that cannot be removed is logged and left behind.
    ///
    /// # Errors
    ///
    /// Returns `ModuleServiceError::NotFound` if the module does not exist.
    /// Returns `ModuleServiceError::Storage` if repository access fails.
    pub async fn delete_module(&self, id: ModuleId) -> Result<(), ModuleServiceError> {
        let module = self
            .modules
            .get_module(id)
            .await?
            .ok_or(ModuleServiceError::NotFound(id))?;

        match self.modules.delete_module(id).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(ModuleServiceError::NotFound(id)),
            Err(err) => return Err(err.into()),
        }

        for file in module.materials().iter().filter_map(|m| m.file()) {
            if let Err(err) = self.files.delete(file.path()).await {
                tracing::warn!(module_id = %id, path = file.path(), %err, "failed to remove stored file");
            }
        }
        tracing::info!(module_id = %id, materials = module.materials().len(), "deleted module");
        Ok(())
    }
}
