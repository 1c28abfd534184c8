// src/db/person_repo.rs

use crate::{common::error::AppError, models::person::Person};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cria uma nova pessoa. Aceita um executor (pool ou transação) porque o
    /// resolver de pessoas roda dentro da transação do motor de versionamento.
    pub async fn create_person<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        first_name: &str,
        middle_name: Option<&str>,
        last_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Person, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (user_id, first_name, middle_name, last_name, email, phone, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(first_name)
        .bind(middle_name)
        .bind(last_name)
        .bind(email)
        .bind(phone)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    /// Busca uma pessoa do usuário pelo ID (pool ou transação).
    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        person_id: Uuid,
    ) -> Result<Option<Person>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Person>("SELECT * FROM persons WHERE id = $1 AND user_id = $2")
            .bind(person_id)
            .bind(user_id)
            .fetch_optional(executor)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Person>, AppError> {
        sqlx::query_as::<_, Person>(
            "SELECT * FROM persons WHERE user_id = $1 ORDER BY last_name, first_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }
}
