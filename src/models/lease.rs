// src/models/lease.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lease_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaseStatus {
    Active,       // Contrato vigente com prazo
    MonthToMonth, // Vigente, renovação mensal (sem data de término)
    Ended,        // Encerrado normalmente
    Voided,       // Anulado (exige motivo; pode ter um sucessor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "pet_species", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PetSpecies {
    Cat,
    Dog,
}

// --- Structs ---

// ---
// 1. Lease (O "Registro de Contrato")
// ---
// UMA versão do contrato de locação: termos legais e conjunto de locatários
// fixos. O conjunto de locatários NUNCA é editado — mudar locatário anula
// este registro e cria um sucessor (ver superseded_by_lease_id).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    pub property_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2025-12-31")]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "1500.00")]
    pub monthly_rent: Option<Decimal>,

    #[schema(example = "1500.00")]
    pub security_deposit: Option<Decimal>,

    pub deposit_paid_date: Option<NaiveDate>,

    #[schema(example = "300.00")]
    pub pet_deposit: Option<Decimal>,

    pub status: LeaseStatus,

    #[schema(example = "lease renewal")]
    pub voided_reason: Option<String>,

    // Preenchido quando este registro foi anulado por troca de locatários.
    // "Anulado e substituído" vs "anulado e encerrado" se distingue por aqui,
    // nunca só pelo status.
    pub superseded_by_lease_id: Option<Uuid>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. LeaseLessee (O Locatário / Signatário)
// ---
// Pertence ao lease (morre/é substituído com ele); referencia uma Person.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseLessee {
    pub id: Uuid,
    pub lease_id: Uuid,
    pub person_id: Uuid,
    pub signed_date: Option<NaiveDate>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. LeaseOccupant (O Morador não-signatário)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseOccupant {
    pub id: Uuid,
    pub lease_id: Uuid,
    pub person_id: Uuid,
    pub is_adult: bool,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 4. LeasePet
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeasePet {
    pub id: Uuid,
    pub lease_id: Uuid,

    #[schema(example = "Rex")]
    pub name: String,

    pub species: PetSpecies,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Linhas "joinadas" com Person (para o agregado) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LesseeDetail {
    pub id: Uuid,
    pub person_id: Uuid,
    pub signed_date: Option<NaiveDate>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OccupantDetail {
    pub id: Uuid,
    pub person_id: Uuid,
    pub is_adult: bool,
    pub move_in_date: Option<NaiveDate>,
    pub move_out_date: Option<NaiveDate>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// O agregado completo retornado por GET /api/leases/{id}
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaseWithDetails {
    #[serde(flatten)]
    pub lease: Lease,
    pub lessees: Vec<LesseeDetail>,
    pub occupants: Vec<OccupantDetail>,
    pub pets: Vec<LeasePet>,
}

// Novo locatário: referência XOR a uma pessoa + data de assinatura opcional
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LesseeInput {
    #[serde(flatten)]
    pub person: crate::models::person::PersonRef,

    #[schema(value_type = String, format = Date)]
    pub signed_date: Option<NaiveDate>,
}

// Resposta das operações de versionamento (addLessee / removeLessee)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaseResponse {
    pub new_lease_id: Uuid,
}

// ---
// Validação Customizada (Decimais)
// ---
pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// NewLeaseTerms (Os termos legais de um novo registro de lease)
// ---
// Usado tanto na criação inicial quanto como `newLeaseData` do motor de
// versionamento. startDate < endDate é checado à parte (regra cross-field).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewLeaseTerms {
    #[schema(value_type = String, format = Date, example = "2025-01-01")]
    pub start_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2025-12-31")]
    pub end_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "1500.00")]
    pub monthly_rent: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1500.00")]
    pub security_deposit: Option<Decimal>,

    pub deposit_paid_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "300.00")]
    pub pet_deposit: Option<Decimal>,
}

// Distingue "campo ausente" (None) de "null explícito" (Some(None)).
// O serde achata os dois por padrão; o map(Some) preserva a camada externa.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// Campos opcionais que acompanham uma troca de status (merge sobre o lease).
// Campo ausente = intocado. Para voidedReason, um null explícito limpa o
// motivo antigo (ao sair de VOIDED), enquanto a ausência o preserva.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeFields {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub voided_reason: Option<Option<String>>,

    #[schema(value_type = String, format = Date)]
    pub end_date: Option<NaiveDate>,

    pub monthly_rent: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
    pub deposit_paid_date: Option<NaiveDate>,
    pub pet_deposit: Option<Decimal>,
}
