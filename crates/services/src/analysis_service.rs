use std::env;
use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use storage::repository::{MaterialRepository, StorageError};
use study_core::model::{GeneratedContent, MaterialId};
use url::Url;

use crate::error::AnalysisError;

const DEFAULT_ANALYSIS_URL: &str = "http://localhost:3001/api";

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub base_url: String,
}

impl AnalysisConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `STUDY_ANALYSIS_URL`, falling back to the local analysis server.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("STUDY_ANALYSIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ANALYSIS_URL.into());
        Self { base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS_URL)
    }
}

/// Client for the document-analysis backend.
///
/// The backend turns a published document URL into a summary, quiz and
/// flashcards; the result is stored on the material as received.
#[derive(Clone)]
pub struct AnalysisService {
    client: Client,
    config: AnalysisConfig,
    materials: Arc<dyn MaterialRepository>,
}

impl AnalysisService {
    #[must_use]
    pub fn from_env(materials: Arc<dyn MaterialRepository>) -> Self {
        Self::new(AnalysisConfig::from_env(), materials)
    }

    #[must_use]
    pub fn new(config: AnalysisConfig, materials: Arc<dyn MaterialRepository>) -> Self {
        Self {
            client: Client::new(),
            config,
            materials,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a material's document and persist the generated content.
    ///
    /// Content defects in the response are logged, not rejected.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::NotFound` or `AnalysisError::MissingFile` when
    /// there is nothing to analyze, and `AnalysisError::Http`/`HttpStatus` when
    /// the backend call fails.
    pub async fn analyze(&self, id: MaterialId) -> Result<GeneratedContent, AnalysisError> {
        let material = self
            .materials
            .get_material(id)
            .await?
            .ok_or(AnalysisError::NotFound(id))?;
        let file = material.file().ok_or(AnalysisError::MissingFile(id))?;

        let content = match self.request(file.url()).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(material_id = %id, %err, "analysis failed");
                return Err(err);
            }
        };

        let defects = content.defects(Some(id));
        if !defects.is_empty() {
            tracing::warn!(
                material_id = %id,
                defects = defects.len(),
                first = %defects[0],
                "analysis returned defective content"
            );
        }

        match self.materials.update_content(id, &content).await {
            Ok(()) => {}
            Err(StorageError::NotFound) => return Err(AnalysisError::NotFound(id)),
            Err(err) => return Err(err.into()),
        }
        tracing::info!(
            material_id = %id,
            questions = content.quiz.len(),
            flashcards = content.flashcards.len(),
            "analysis stored"
        );
        Ok(content)
    }

    /// Ask the backend to analyze the document at `file_url`.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::Http` for transport or decoding failures and
    /// `AnalysisError::HttpStatus` for non-success responses.
    pub async fn request(&self, file_url: &Url) -> Result<GeneratedContent, AnalysisError> {
        let payload = AnalyzeRequest {
            file_url: file_url.as_str(),
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error);
            return Err(AnalysisError::HttpStatus { status, message });
        }

        Ok(response.json::<GeneratedContent>().await?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    file_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}
