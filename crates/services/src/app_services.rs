use std::path::PathBuf;
use std::sync::Arc;

use storage::repository::Storage;
use study_core::NotificationSink;
use url::Url;

use crate::Clock;
use crate::analysis_service::{AnalysisConfig, AnalysisService};
use crate::error::AppServicesError;
use crate::material_service::MaterialService;
use crate::module_service::ModuleService;
use crate::study::StudyService;
use crate::uploads::{FileStore, LocalFileStore};

/// Where uploads are written and how they are published.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub root: PathBuf,
    /// Public URL prefix for stored files; `file://` URLs into `root` when unset.
    pub public_base: Option<Url>,
}

impl UploadConfig {
    /// Reads `STUDY_UPLOAD_DIR` and `STUDY_PUBLIC_BASE_URL`.
    #[must_use]
    pub fn from_env() -> Self {
        let root = std::env::var("STUDY_UPLOAD_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("uploads"), PathBuf::from);
        let public_base = std::env::var("STUDY_PUBLIC_BASE_URL")
            .ok()
            .and_then(|raw| match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(err) => {
                    tracing::warn!(raw, %err, "ignoring invalid STUDY_PUBLIC_BASE_URL");
                    None
                }
            });
        Self { root, public_base }
    }

    fn build(self) -> Result<LocalFileStore, AppServicesError> {
        Ok(match self.public_base {
            Some(base) => LocalFileStore::new(self.root, base),
            None => LocalFileStore::with_file_urls(self.root)?,
        })
    }
}

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    modules: Arc<ModuleService>,
    materials: Arc<MaterialService>,
    analysis: Arc<AnalysisService>,
    study: Arc<StudyService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or file store setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        uploads: UploadConfig,
        analysis: AnalysisConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let files: Arc<dyn FileStore> = Arc::new(uploads.build()?);
        Ok(Self::from_parts(&storage, clock, files, analysis, sink))
    }

    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        clock: Clock,
        files: Arc<dyn FileStore>,
        analysis: AnalysisConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let modules = Arc::new(ModuleService::new(
            clock,
            Arc::clone(&storage.modules),
            Arc::clone(&files),
        ));
        let materials = Arc::new(MaterialService::new(
            clock,
            Arc::clone(&storage.modules),
            Arc::clone(&storage.materials),
            files,
        ));
        let analysis = Arc::new(AnalysisService::new(
            analysis,
            Arc::clone(&storage.materials),
        ));
        let study = Arc::new(StudyService::new(Arc::clone(&storage.modules), sink));

        Self {
            modules,
            materials,
            analysis,
            study,
        }
    }

    #[must_use]
    pub fn modules(&self) -> Arc<ModuleService> {
        Arc::clone(&self.modules)
    }

    #[must_use]
    pub fn materials(&self) -> Arc<MaterialService> {
        Arc::clone(&self.materials)
    }

    #[must_use]
    pub fn analysis(&self) -> Arc<AnalysisService> {
        Arc::clone(&self.analysis)
    }

    #[must_use]
    pub fn study(&self) -> Arc<StudyService> {
        Arc::clone(&self.study)
    }
}
