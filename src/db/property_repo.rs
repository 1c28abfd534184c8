// src/db/property_repo.rs

use crate::{
    common::error::AppError,
    models::property::{CreatePropertyPayload, Property, UpdatePropertyPayload},
};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        payload: &CreatePropertyPayload,
    ) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties
                (user_id, name, address_line1, address_line2, city, state, postal_code, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.address_line1)
        .bind(&payload.address_line2)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.postal_code)
        .bind(&payload.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(property_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Property>, AppError> {
        sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE user_id = $1 AND deleted_at IS NULL ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    // Atualização parcial: COALESCE mantém o valor atual quando o campo não veio.
    pub async fn update(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        payload: &UpdatePropertyPayload,
    ) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                name          = COALESCE($3, name),
                address_line1 = COALESCE($4, address_line1),
                address_line2 = COALESCE($5, address_line2),
                city          = COALESCE($6, city),
                state         = COALESCE($7, state),
                postal_code   = COALESCE($8, postal_code),
                notes         = COALESCE($9, notes),
                updated_at    = now()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.address_line1)
        .bind(&payload.address_line2)
        .bind(&payload.city)
        .bind(&payload.state)
        .bind(&payload.postal_code)
        .bind(&payload.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    // Soft delete: o imóvel some das listagens mas o histórico de leases fica.
    pub async fn soft_delete(&self, user_id: Uuid, property_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE properties SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }
}
