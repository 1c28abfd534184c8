// src/models/person.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Person (O "Registro de Identidade")
// ---
// Locatários (lessees) e ocupantes apenas referenciam pessoas.
// Uma pessoa nunca é apagada por este núcleo — só referenciada ou criada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Uuid,

    #[schema(ignore)]
    pub user_id: Uuid,

    #[schema(example = "Ana")]
    pub first_name: String,
    pub middle_name: Option<String>,

    #[schema(example = "Silva")]
    pub last_name: String,

    #[schema(example = "ana@exemplo.com")]
    pub email: Option<String>,

    #[schema(example = "5551234567")]
    pub phone: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Campos para criação direta de uma pessoa (POST /api/persons)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonPayload {
    #[validate(length(min = 1, message = "O primeiro nome é obrigatório."))]
    pub first_name: String,

    pub middle_name: Option<String>,

    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub notes: Option<String>,
}

// ---
// PersonRef (Entrada XOR)
// ---
// Referência a uma pessoa em exatamente UMA de duas formas:
// `personId` OU campos inline para criação. As duas ao mesmo tempo
// (ou nenhuma) é erro de validação — a regra vive no PersonService.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonRef {
    pub person_id: Option<Uuid>,

    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}
