use study_core::model::{GeneratedContent, Material, MaterialId};

use super::SqliteRepository;
use super::mapping::{MATERIAL_COLUMNS, conn, content_columns, map_material_row};
use crate::repository::{MaterialRepository, StorageError};

#[async_trait::async_trait]
impl MaterialRepository for SqliteRepository {
    async fn append_material(&self, material: &Material) -> Result<(), StorageError> {
        let module_id = material.module_id().to_string();
        let columns = content_columns(material.content())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let module_exists = sqlx::query("SELECT 1 FROM modules WHERE id = ?1")
            .bind(&module_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?
            .is_some();
        if !module_exists {
            return Err(StorageError::NotFound);
        }

        let taken = sqlx::query("SELECT 1 FROM materials WHERE id = ?1")
            .bind(material.id().to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?
            .is_some();
        if taken {
            return Err(StorageError::Conflict);
        }

        sqlx::query(
            r"
            INSERT INTO materials (
                id, module_id, position, title, kind, created_at,
                file_path, file_url, summary_json, quiz_json, flashcards_json
            )
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM materials WHERE module_id = ?2),
                ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
            )
            ",
        )
        .bind(material.id().to_string())
        .bind(&module_id)
        .bind(material.title())
        .bind(material.kind())
        .bind(material.created_at())
        .bind(material.file().map(|f| f.path().to_owned()))
        .bind(material.file().map(|f| f.url().to_string()))
        .bind(columns.summary)
        .bind(columns.quiz)
        .bind(columns.flashcards)
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_material(&self, id: MaterialId) -> Result<Option<Material>, StorageError> {
        let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_material_row).transpose()
    }

    async fn update_content(
        &self,
        id: MaterialId,
        content: &GeneratedContent,
    ) -> Result<(), StorageError> {
        let columns = content_columns(content)?;
        let res = sqlx::query(
            r"
            UPDATE materials
            SET summary_json = ?2, quiz_json = ?3, flashcards_json = ?4
            WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .bind(columns.summary)
        .bind(columns.quiz)
        .bind(columns.flashcards)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_material(&self, id: MaterialId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM materials WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
