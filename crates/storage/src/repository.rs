use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use study_core::model::{GeneratedContent, Material, MaterialId, Module, ModuleId};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for modules.
///
/// Modules are returned as complete snapshots, materials included in
/// presentation order.
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Persist or update a module's own fields. Its materials are not touched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the module cannot be stored.
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError>;

    /// Fetch a module with its materials.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend or decoding failures.
    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError>;

    /// List every module, oldest first, with materials.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend or decoding failures.
    async fn list_modules(&self) -> Result<Vec<Module>, StorageError>;

    /// Delete a module and all of its materials.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the module does not exist.
    async fn delete_module(&self, id: ModuleId) -> Result<(), StorageError>;
}

/// Repository contract for materials.
#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Store a new material after the existing materials of its module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the owning module is missing and
    /// `StorageError::Conflict` if the material id is already taken.
    async fn append_material(&self, material: &Material) -> Result<(), StorageError>;

    /// Fetch a single material.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend or decoding failures.
    async fn get_material(&self, id: MaterialId) -> Result<Option<Material>, StorageError>;

    /// Replace the generated content of a material.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the material does not exist.
    async fn update_content(
        &self,
        id: MaterialId,
        content: &GeneratedContent,
    ) -> Result<(), StorageError>;

    /// Delete a material.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the material does not exist.
    async fn delete_material(&self, id: MaterialId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    modules: Arc<Mutex<HashMap<ModuleId, Module>>>,
    // Insertion order doubles as presentation order.
    materials: Arc<Mutex<Vec<Material>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn assemble(&self, module: &Module) -> Result<Module, StorageError> {
        let guard = self
            .materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let owned = guard
            .iter()
            .filter(|m| m.module_id() == module.id())
            .cloned()
            .collect();
        module
            .clone()
            .with_materials(owned)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        let mut guard = self
            .modules
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let header = module
            .clone()
            .with_materials(Vec::new())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.insert(module.id(), header);
        Ok(())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let header = {
            let guard = self
                .modules
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.get(&id).cloned()
        };
        header.map(|m| self.assemble(&m)).transpose()
    }

    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let mut headers: Vec<Module> = {
            let guard = self
                .modules
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.values().cloned().collect()
        };
        headers.sort_by_key(|m| (m.created_at(), m.id()));
        headers.iter().map(|m| self.assemble(m)).collect()
    }

    async fn delete_module(&self, id: ModuleId) -> Result<(), StorageError> {
        let removed = self
            .modules
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .remove(&id);
        if removed.is_none() {
            return Err(StorageError::NotFound);
        }
        self.materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .retain(|m| m.module_id() != id);
        Ok(())
    }
}

#[async_trait]
impl MaterialRepository for InMemoryRepository {
    async fn append_material(&self, material: &Material) -> Result<(), StorageError> {
        let module_exists = self
            .modules
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .contains_key(&material.module_id());
        if !module_exists {
            return Err(StorageError::NotFound);
        }

        let mut guard = self
            .materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|m| m.id() == material.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(material.clone());
        Ok(())
    }

    async fn get_material(&self, id: MaterialId) -> Result<Option<Material>, StorageError> {
        let guard = self
            .materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|m| m.id() == id).cloned())
    }

    async fn update_content(
        &self,
        id: MaterialId,
        content: &GeneratedContent,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let material = guard
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(StorageError::NotFound)?;
        material.set_content(content.clone());
        Ok(())
    }

    async fn delete_material(&self, id: MaterialId) -> Result<(), StorageError> {
        let mut guard = self
            .materials
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let before = guard.len();
        guard.retain(|m| m.id() != id);
        if guard.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

/// Aggregates module and material repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub modules: Arc<dyn ModuleRepository>,
    pub materials: Arc<dyn MaterialRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let modules: Arc<dyn ModuleRepository> = Arc::new(repo.clone());
        let materials: Arc<dyn MaterialRepository> = Arc::new(repo);
        Self { modules, materials }
    }
}
