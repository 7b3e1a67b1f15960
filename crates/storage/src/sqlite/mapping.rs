use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use study_core::model::{
    Flashcard, GeneratedContent, Material, MaterialId, Module, ModuleId, QuizQuestion, StoredFile,
    Summary,
};
use url::Url;

use crate::repository::StorageError;

pub(crate) const MATERIAL_COLUMNS: &str = "id, module_id, position, title, kind, created_at, \
     file_path, file_url, summary_json, quiz_json, flashcards_json";

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn parse_id<T: std::str::FromStr>(row: &SqliteRow, column: &str) -> Result<T, StorageError>
where
    T::Err: core::fmt::Display,
{
    row.try_get::<String, _>(column)
        .map_err(ser)?
        .parse()
        .map_err(ser)
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

/// The three JSON columns a material's generated content is split across.
pub(crate) struct ContentColumns {
    pub summary: Option<String>,
    pub quiz: String,
    pub flashcards: String,
}

pub(crate) fn content_columns(content: &GeneratedContent) -> Result<ContentColumns, StorageError> {
    Ok(ContentColumns {
        summary: content.summary.as_ref().map(to_json).transpose()?,
        quiz: to_json(&content.quiz)?,
        flashcards: to_json(&content.flashcards)?,
    })
}

pub(crate) fn map_module_row(row: &SqliteRow) -> Result<Module, StorageError> {
    let id: ModuleId = parse_id(row, "id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    Module::new(
        id,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        created_at,
    )
    .map_err(ser)
}

pub(crate) fn map_material_row(row: &SqliteRow) -> Result<Material, StorageError> {
    let id: MaterialId = parse_id(row, "id")?;
    let module_id: ModuleId = parse_id(row, "module_id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    let summary = row
        .try_get::<Option<String>, _>("summary_json")
        .map_err(ser)?
        .map(|raw| serde_json::from_str::<Summary>(&raw))
        .transpose()
        .map_err(ser)?;
    let quiz: Vec<QuizQuestion> =
        serde_json::from_str(&row.try_get::<String, _>("quiz_json").map_err(ser)?).map_err(ser)?;
    let flashcards: Vec<Flashcard> =
        serde_json::from_str(&row.try_get::<String, _>("flashcards_json").map_err(ser)?)
            .map_err(ser)?;

    let mut material = Material::new(
        id,
        module_id,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("kind").map_err(ser)?,
        created_at,
    )
    .map_err(ser)?
    .with_content(GeneratedContent {
        summary,
        quiz,
        flashcards,
    });

    let file_path: Option<String> = row.try_get("file_path").map_err(ser)?;
    let file_url: Option<String> = row.try_get("file_url").map_err(ser)?;
    match (file_path, file_url) {
        (Some(path), Some(url)) => {
            let url = Url::parse(&url).map_err(ser)?;
            material = material.with_file(StoredFile::new(path, url).map_err(ser)?);
        }
        (None, None) => {}
        _ => {
            return Err(StorageError::Serialization(format!(
                "material {id} has a partial file reference"
            )));
        }
    }

    Ok(material)
}
