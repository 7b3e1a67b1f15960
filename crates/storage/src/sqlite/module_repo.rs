use std::collections::HashMap;

use study_core::model::{Material, Module, ModuleId};

use super::SqliteRepository;
use super::mapping::{MATERIAL_COLUMNS, conn, map_material_row, map_module_row, ser};
use crate::repository::{ModuleRepository, StorageError};

impl SqliteRepository {
    async fn materials_for(&self, module_id: ModuleId) -> Result<Vec<Material>, StorageError> {
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE module_id = ?1 ORDER BY position ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(module_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;
        rows.iter().map(map_material_row).collect()
    }
}

#[async_trait::async_trait]
impl ModuleRepository for SqliteRepository {
    async fn upsert_module(&self, module: &Module) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO modules (id, title, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description
            ",
        )
        .bind(module.id().to_string())
        .bind(module.title())
        .bind(module.description())
        .bind(module.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_module(&self, id: ModuleId) -> Result<Option<Module>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, created_at
            FROM modules WHERE id = ?1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let module = map_module_row(&row)?;
        let materials = self.materials_for(id).await?;
        module.with_materials(materials).map(Some).map_err(ser)
    }

    async fn list_modules(&self) -> Result<Vec<Module>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, created_at
            FROM modules
            ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials ORDER BY module_id ASC, position ASC"
        );
        let material_rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut by_module: HashMap<ModuleId, Vec<Material>> = HashMap::new();
        for row in &material_rows {
            let material = map_material_row(row)?;
            by_module
                .entry(material.module_id())
                .or_default()
                .push(material);
        }

        let mut modules = Vec::with_capacity(rows.len());
        for row in rows {
            let module = map_module_row(&row)?;
            let materials = by_module.remove(&module.id()).unwrap_or_default();
            modules.push(module.with_materials(materials).map_err(ser)?);
        }
        Ok(modules)
    }

    async fn delete_module(&self, id: ModuleId) -> Result<(), StorageError> {
        // Materials go with it through ON DELETE CASCADE.
        let res = sqlx::query("DELETE FROM modules WHERE id = ?1")
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
