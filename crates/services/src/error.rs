//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::{MaterialError, MaterialId, ModuleError, ModuleId};

/// Errors emitted by `FileStore` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FileStoreError {
    #[error("file name {0:?} is not usable")]
    InvalidName(String),
    #[error("stored path {0:?} escapes the upload root")]
    InvalidPath(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `ModuleService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleServiceError {
    #[error("module {0} does not exist")]
    NotFound(ModuleId),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `MaterialService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MaterialServiceError {
    #[error("module {0} does not exist")]
    ModuleNotFound(ModuleId),
    #[error("material {0} does not exist")]
    NotFound(MaterialId),
    #[error(transparent)]
    Material(#[from] MaterialError),
    #[error(transparent)]
    FileStore(#[from] FileStoreError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AnalysisService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("material {0} does not exist")]
    NotFound(MaterialId),
    #[error("material {0} has no file to analyze")]
    MissingFile(MaterialId),
    #[error(
        "analysis request failed with status {status}: {}",
        .message.as_deref().unwrap_or("no details")
    )]
    HttpStatus {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while opening study sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("module {0} does not exist")]
    ModuleNotFound(ModuleId),
    #[error("material {0} is not part of this module")]
    MaterialNotFound(MaterialId),
    #[error("scope belongs to module {0}, not the loaded one")]
    ForeignModule(ModuleId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    FileStore(#[from] FileStoreError),
}
