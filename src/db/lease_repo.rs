// src/db/lease_repo.rs

use crate::{
    common::error::AppError,
    models::lease::{
        Lease, LeaseLessee, LeaseOccupant, LeasePet, LeaseStatus, LesseeDetail, NewLeaseTerms,
        OccupantDetail, PetSpecies,
    },
};
use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct LeaseRepository {
    pool: PgPool,
}

impl LeaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Leases ---

    /// Insere um novo registro de lease. Aceita um executor (pool ou transação)
    /// porque o sucessor nasce dentro da transação de versionamento.
    pub async fn create_lease<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        property_id: Uuid,
        terms: &NewLeaseTerms,
        status: LeaseStatus,
    ) -> Result<Lease, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lease>(
            r#"
            INSERT INTO leases
                (user_id, property_id, start_date, end_date, monthly_rent,
                 security_deposit, deposit_paid_date, pet_deposit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(property_id)
        .bind(terms.start_date)
        .bind(terms.end_date)
        .bind(terms.monthly_rent)
        .bind(terms.security_deposit)
        .bind(terms.deposit_paid_date)
        .bind(terms.pet_deposit)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn find_by_id(
        &self,
        user_id: Uuid,
        lease_id: Uuid,
    ) -> Result<Option<Lease>, AppError> {
        sqlx::query_as::<_, Lease>(
            "SELECT * FROM leases WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(lease_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn list_for_property(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        include_voided: bool,
    ) -> Result<Vec<Lease>, AppError> {
        sqlx::query_as::<_, Lease>(
            r#"
            SELECT * FROM leases
            WHERE property_id = $1 AND user_id = $2 AND deleted_at IS NULL
              AND ($3 OR status <> 'VOIDED')
            ORDER BY start_date DESC, created_at DESC
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .bind(include_voided)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    /// Persiste os campos mutáveis de um lease já carregado (troca de status
    /// direta via máquina de estados). O conjunto de locatários NUNCA passa
    /// por aqui.
    pub async fn update_status_fields<'e, E>(
        &self,
        executor: E,
        lease: &Lease,
    ) -> Result<Lease, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lease>(
            r#"
            UPDATE leases SET
                status            = $2,
                voided_reason     = $3,
                end_date          = $4,
                monthly_rent      = $5,
                security_deposit  = $6,
                deposit_paid_date = $7,
                pet_deposit       = $8,
                updated_at        = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(lease.id)
        .bind(lease.status)
        .bind(&lease.voided_reason)
        .bind(lease.end_date)
        .bind(lease.monthly_rent)
        .bind(lease.security_deposit)
        .bind(lease.deposit_paid_date)
        .bind(lease.pet_deposit)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    /// Anula o lease com guarda condicional (compare-and-swap): só escreve se
    /// o status ainda for o esperado. `None` = outra requisição chegou antes,
    /// o que o serviço converte em erro de conflito.
    pub async fn void_guarded<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        expected_status: LeaseStatus,
        reason: &str,
    ) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lease>(
            r#"
            UPDATE leases SET
                status        = 'VOIDED',
                voided_reason = $3,
                updated_at    = now()
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(lease_id)
        .bind(expected_status)
        .bind(reason)
        .fetch_optional(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    /// Liga o antecessor anulado ao seu sucessor (na mesma transação que criou
    /// o sucessor).
    pub async fn set_superseded_by<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        successor_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE leases SET superseded_by_lease_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(lease_id)
        .bind(successor_id)
        .execute(executor)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(())
    }

    // --- Lessees ---

    pub async fn insert_lessee<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        person_id: Uuid,
        signed_date: Option<NaiveDate>,
    ) -> Result<LeaseLessee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeaseLessee>(
            r#"
            INSERT INTO lease_lessees (lease_id, person_id, signed_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(lease_id)
        .bind(person_id)
        .bind(signed_date)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn list_lessees<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
    ) -> Result<Vec<LeaseLessee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeaseLessee>(
            "SELECT * FROM lease_lessees WHERE lease_id = $1 AND deleted_at IS NULL ORDER BY created_at",
        )
        .bind(lease_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    // --- Occupants ---

    pub async fn insert_occupant<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        person_id: Uuid,
        is_adult: bool,
        move_in_date: Option<NaiveDate>,
        move_out_date: Option<NaiveDate>,
    ) -> Result<LeaseOccupant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeaseOccupant>(
            r#"
            INSERT INTO lease_occupants (lease_id, person_id, is_adult, move_in_date, move_out_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(lease_id)
        .bind(person_id)
        .bind(is_adult)
        .bind(move_in_date)
        .bind(move_out_date)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn find_occupant(
        &self,
        lease_id: Uuid,
        occupant_id: Uuid,
    ) -> Result<Option<LeaseOccupant>, AppError> {
        sqlx::query_as::<_, LeaseOccupant>(
            "SELECT * FROM lease_occupants WHERE id = $1 AND lease_id = $2 AND deleted_at IS NULL",
        )
        .bind(occupant_id)
        .bind(lease_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    // Ocupante sai por soft delete: a linha fica para auditoria.
    pub async fn soft_delete_occupant<'e, E>(
        &self,
        executor: E,
        occupant_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE lease_occupants SET deleted_at = now(), updated_at = now() WHERE id = $1",
        )
        .bind(occupant_id)
        .execute(executor)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(())
    }

    /// Ocupantes "atuais": não removidos e sem data de saída. São esses que o
    /// motor de versionamento copia para o sucessor.
    pub async fn list_current_occupants<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
    ) -> Result<Vec<LeaseOccupant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeaseOccupant>(
            r#"
            SELECT * FROM lease_occupants
            WHERE lease_id = $1 AND deleted_at IS NULL AND move_out_date IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(lease_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    // --- Pets ---

    pub async fn insert_pet<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        name: &str,
        species: PetSpecies,
        notes: Option<&str>,
    ) -> Result<LeasePet, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeasePet>(
            r#"
            INSERT INTO lease_pets (lease_id, name, species, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(lease_id)
        .bind(name)
        .bind(species)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn find_pet(
        &self,
        lease_id: Uuid,
        pet_id: Uuid,
    ) -> Result<Option<LeasePet>, AppError> {
        sqlx::query_as::<_, LeasePet>("SELECT * FROM lease_pets WHERE id = $1 AND lease_id = $2")
            .bind(pet_id)
            .bind(lease_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn delete_pet<'e, E>(&self, executor: E, pet_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM lease_pets WHERE id = $1")
            .bind(pet_id)
            .execute(executor)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(())
    }

    pub async fn list_pets<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
    ) -> Result<Vec<LeasePet>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LeasePet>(
            "SELECT * FROM lease_pets WHERE lease_id = $1 ORDER BY created_at",
        )
        .bind(lease_id)
        .fetch_all(executor)
        .await
        .map_err(AppError::DatabaseError)
    }

    // --- Linhas joinadas com Person (para o agregado do GET) ---

    pub async fn list_lessee_details(&self, lease_id: Uuid) -> Result<Vec<LesseeDetail>, AppError> {
        sqlx::query_as::<_, LesseeDetail>(
            r#"
            SELECT ll.id, ll.person_id, ll.signed_date,
                   p.first_name, p.middle_name, p.last_name, p.email, p.phone
            FROM lease_lessees ll
            JOIN persons p ON p.id = ll.person_id
            WHERE ll.lease_id = $1 AND ll.deleted_at IS NULL
            ORDER BY ll.created_at
            "#,
        )
        .bind(lease_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    pub async fn list_occupant_details(
        &self,
        lease_id: Uuid,
    ) -> Result<Vec<OccupantDetail>, AppError> {
        sqlx::query_as::<_, OccupantDetail>(
            r#"
            SELECT lo.id, lo.person_id, lo.is_adult, lo.move_in_date, lo.move_out_date,
                   p.first_name, p.middle_name, p.last_name, p.email, p.phone
            FROM lease_occupants lo
            JOIN persons p ON p.id = lo.person_id
            WHERE lo.lease_id = $1 AND lo.deleted_at IS NULL
            ORDER BY lo.created_at
            "#,
        )
        .bind(lease_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }
}
