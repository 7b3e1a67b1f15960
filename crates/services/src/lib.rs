#![forbid(unsafe_code)]

pub mod analysis_service;
pub mod app_services;
pub mod error;
pub mod material_service;
pub mod module_service;
pub mod study;
pub mod uploads;

pub use study_core::Clock;

pub use analysis_service::{AnalysisConfig, AnalysisService};
pub use app_services::{AppServices, UploadConfig};
pub use error::{
    AnalysisError, AppServicesError, FileStoreError, MaterialServiceError, ModuleServiceError,
    StudyError,
};
pub use material_service::MaterialService;
pub use module_service::ModuleService;
pub use study::{CardAction, QuizAction, StudyService, StudyWorkspace};
pub use uploads::{FileStore, LocalFileStore};
