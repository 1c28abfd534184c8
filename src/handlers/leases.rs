// src/handlers/leases.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        lease::{
            Lease, LeaseStatus, LeaseWithDetails, LesseeInput, NewLeaseResponse, NewLeaseTerms,
            PetSpecies, StatusChangeFields,
        },
        person::PersonRef,
    },
};

// ---
// Payload: CreateLease
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeasePayload {
    #[serde(flatten)]
    #[validate(nested)]
    pub terms: NewLeaseTerms,

    // Ausente = ACTIVE. Só ACTIVE e MONTH_TO_MONTH são aceitos no nascimento.
    pub status: Option<LeaseStatus>,

    pub lessees: Vec<LesseeInput>,
}

impl CreateLeasePayload {
    fn validate_consistency(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        // Regra: endDate, quando presente, vem depois do startDate.
        if let Some(end_date) = self.terms.end_date {
            if self.terms.start_date >= end_date {
                errors.add("endDate", ValidationError::new("EndDateBeforeStartDate"));
            }
        }
        // Regra: um lease nunca nasce sem signatário.
        if self.lessees.is_empty() {
            errors.add("lessees", ValidationError::new("AtLeastOneLesseeRequired"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

// ---
// Payload: ChangeStatus
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusPayload {
    pub status: LeaseStatus,

    #[serde(flatten)]
    pub fields: StatusChangeFields,
}

// ---
// Payloads: motor de versionamento
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLesseePayload {
    #[schema(example = "lease renewal")]
    pub voided_reason: Option<String>,

    pub new_lessee: LesseeInput,

    #[validate(nested)]
    pub new_lease_data: NewLeaseTerms,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLesseePayload {
    #[schema(example = "Bob moved out")]
    pub voided_reason: Option<String>,

    #[validate(nested)]
    pub new_lease_data: NewLeaseTerms,
}

// ---
// Payload: AddOccupant
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOccupantPayload {
    pub is_adult: bool,

    #[schema(value_type = String, format = Date)]
    pub move_in_date: Option<NaiveDate>,

    #[serde(flatten)]
    pub person: PersonRef,
}

// ---
// Payload: AddPet
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPetPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    #[schema(example = "Rex")]
    pub name: String,

    pub species: PetSpecies,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListLeasesQuery {
    // Registros VOIDED (substituídos ou encerrados) ficam fora por padrão
    pub include_voided: Option<bool>,
}

// ---
// Handler: create_lease
// ---
#[utoipa::path(
    post,
    path = "/api/properties/{property_id}/leases",
    tag = "Leases",
    request_body = CreateLeasePayload,
    params(
        ("property_id" = Uuid, Path, description = "ID do Imóvel")
    ),
    responses(
        (status = 201, description = "Contrato criado", body = LeaseWithDetails)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lease(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<CreateLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    // Validação padrão do Validator
    payload.validate().map_err(AppError::ValidationError)?;

    // Nossa validação de consistência manual
    payload.validate_consistency().map_err(AppError::ValidationError)?;

    let lease = app_state
        .lease_service
        .create_lease(
            user.id,
            property_id,
            payload.status,
            payload.terms,
            &payload.lessees,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lease)))
}

// ---
// Handler: list_leases
// ---
#[utoipa::path(
    get,
    path = "/api/properties/{property_id}/leases",
    tag = "Leases",
    params(
        ("property_id" = Uuid, Path, description = "ID do Imóvel"),
        ListLeasesQuery
    ),
    responses(
        (status = 200, description = "Contratos do imóvel", body = [Lease])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leases(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Query(query): Query<ListLeasesQuery>,
) -> Result<Json<Vec<Lease>>, AppError> {
    let leases = app_state
        .lease_service
        .list_leases(user.id, property_id, query.include_voided.unwrap_or(false))
        .await?;
    Ok(Json(leases))
}

// ---
// Handler: get_lease (o agregado completo)
// ---
#[utoipa::path(
    get,
    path = "/api/leases/{lease_id}",
    tag = "Leases",
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato")
    ),
    responses(
        (status = 200, description = "Contrato com locatários, ocupantes e pets", body = LeaseWithDetails),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lease(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lease_id): Path<Uuid>,
) -> Result<Json<LeaseWithDetails>, AppError> {
    let lease = app_state.lease_service.get_lease(user.id, lease_id).await?;
    Ok(Json(lease))
}

// ---
// Handler: change_lease_status (máquina de estados, sem versionamento)
// ---
#[utoipa::path(
    patch,
    path = "/api/leases/{lease_id}/status",
    tag = "Leases",
    request_body = ChangeStatusPayload,
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato")
    ),
    responses(
        (status = 200, description = "Status alterado", body = Lease),
        (status = 400, description = "Transição inválida (ex: VOIDED sem motivo)")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_lease_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<Json<Lease>, AppError> {
    let lease = app_state
        .lease_service
        .change_status(user.id, lease_id, payload.status, &payload.fields)
        .await?;
    Ok(Json(lease))
}

// ---
// Handler: add_lessee (motor de versionamento)
// ---
#[utoipa::path(
    post,
    path = "/api/leases/{lease_id}/lessees",
    tag = "Leases",
    request_body = AddLesseePayload,
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato a ser substituído")
    ),
    responses(
        (status = 201, description = "Antecessor anulado; sucessor criado", body = NewLeaseResponse),
        (status = 409, description = "Outra requisição alterou o contrato antes")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_lessee(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<AddLesseePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state
        .lease_service
        .add_lessee(
            user.id,
            lease_id,
            payload.voided_reason.as_deref(),
            &payload.new_lessee,
            &payload.new_lease_data,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// ---
// Handler: remove_lessee (motor de versionamento)
// ---
#[utoipa::path(
    delete,
    path = "/api/leases/{lease_id}/lessees/{person_id}",
    tag = "Leases",
    request_body = RemoveLesseePayload,
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato a ser substituído"),
        ("person_id" = Uuid, Path, description = "ID da Pessoa a remover do quadro de locatários")
    ),
    responses(
        (status = 201, description = "Antecessor anulado; sucessor criado", body = NewLeaseResponse),
        (status = 400, description = "Remoção deixaria o contrato sem signatários"),
        (status = 409, description = "Outra requisição alterou o contrato antes")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_lessee(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((lease_id, person_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RemoveLesseePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state
        .lease_service
        .remove_lessee(
            user.id,
            lease_id,
            person_id,
            payload.voided_reason.as_deref(),
            &payload.new_lease_data,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// ---
// Handler: add_occupant (in-place)
// ---
#[utoipa::path(
    post,
    path = "/api/leases/{lease_id}/occupants",
    tag = "Leases",
    request_body = AddOccupantPayload,
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato")
    ),
    responses(
        (status = 201, description = "Ocupante adicionado", body = LeaseWithDetails)
    ),
    security(("api_jwt" = []))
)]
pub async fn add_occupant(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<AddOccupantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state
        .lease_service
        .add_occupant(
            user.id,
            lease_id,
            &payload.person,
            payload.is_adult,
            payload.move_in_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lease)))
}

// ---
// Handler: remove_occupant (in-place)
// ---
#[utoipa::path(
    delete,
    path = "/api/leases/{lease_id}/occupants/{occupant_id}",
    tag = "Leases",
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato"),
        ("occupant_id" = Uuid, Path, description = "ID do Ocupante")
    ),
    responses(
        (status = 200, description = "Ocupante removido", body = LeaseWithDetails),
        (status = 404, description = "Ocupante não pertence ao contrato")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_occupant(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((lease_id, occupant_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LeaseWithDetails>, AppError> {
    let lease = app_state
        .lease_service
        .remove_occupant(user.id, lease_id, occupant_id)
        .await?;
    Ok(Json(lease))
}

// ---
// Handler: add_pet (in-place)
// ---
#[utoipa::path(
    post,
    path = "/api/leases/{lease_id}/pets",
    tag = "Leases",
    request_body = AddPetPayload,
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato")
    ),
    responses(
        (status = 201, description = "Pet adicionado", body = LeaseWithDetails)
    ),
    security(("api_jwt" = []))
)]
pub async fn add_pet(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<AddPetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lease = app_state
        .lease_service
        .add_pet(
            user.id,
            lease_id,
            &payload.name,
            payload.species,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lease)))
}

// ---
// Handler: remove_pet (in-place)
// ---
#[utoipa::path(
    delete,
    path = "/api/leases/{lease_id}/pets/{pet_id}",
    tag = "Leases",
    params(
        ("lease_id" = Uuid, Path, description = "ID do Contrato"),
        ("pet_id" = Uuid, Path, description = "ID do Pet")
    ),
    responses(
        (status = 200, description = "Pet removido", body = LeaseWithDetails),
        (status = 404, description = "Pet não pertence ao contrato")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_pet(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((lease_id, pet_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LeaseWithDetails>, AppError> {
    let lease = app_state
        .lease_service
        .remove_pet(user.id, lease_id, pet_id)
        .await?;
    Ok(Json(lease))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn add_lessee_payload_deserializes_from_camel_case() {
        let json = r#"{
            "voidedReason": "lease renewal",
            "newLessee": {
                "firstName": "Ann",
                "lastName": "Lee",
                "email": "a@x.com",
                "phone": "5551234567"
            },
            "newLeaseData": { "startDate": "2025-01-01" }
        }"#;

        let payload: AddLesseePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.voided_reason.as_deref(), Some("lease renewal"));
        assert_eq!(payload.new_lessee.person.first_name.as_deref(), Some("Ann"));
        assert!(payload.new_lessee.person.person_id.is_none());
        assert_eq!(
            payload.new_lease_data.start_date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(payload.new_lease_data.end_date.is_none());
    }

    #[test]
    fn occupant_payload_accepts_person_id_reference() {
        let json = r#"{
            "isAdult": true,
            "personId": "550e8400-e29b-41d4-a716-446655440000"
        }"#;

        let payload: AddOccupantPayload = serde_json::from_str(json).unwrap();
        assert!(payload.is_adult);
        assert!(payload.person.person_id.is_some());
        assert!(payload.person.first_name.is_none());
    }

    #[test]
    fn pet_species_rejects_anything_but_cat_or_dog() {
        let ok: AddPetPayload =
            serde_json::from_str(r#"{ "name": "Rex", "species": "dog" }"#).unwrap();
        assert_eq!(ok.species, PetSpecies::Dog);

        let err = serde_json::from_str::<AddPetPayload>(r#"{ "name": "Piu", "species": "bird" }"#);
        assert!(err.is_err());
    }

    #[test]
    fn pet_name_length_is_bounded() {
        let long_name = "x".repeat(101);
        let payload = AddPetPayload {
            name: long_name,
            species: PetSpecies::Cat,
            notes: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn lease_status_uses_screaming_snake_case_on_the_wire() {
        let json = r#"{ "status": "MONTH_TO_MONTH" }"#;
        let payload: ChangeStatusPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.status, LeaseStatus::MonthToMonth);

        assert_eq!(
            serde_json::to_string(&LeaseStatus::Voided).unwrap(),
            "\"VOIDED\""
        );
    }

    #[test]
    fn create_lease_consistency_rejects_inverted_dates() {
        let json = r#"{
            "startDate": "2025-06-01",
            "endDate": "2025-01-01",
            "lessees": [ { "firstName": "Ann", "lastName": "Lee" } ]
        }"#;
        let payload: CreateLeasePayload = serde_json::from_str(json).unwrap();
        let errors = payload.validate_consistency().unwrap_err();
        assert!(errors.field_errors().contains_key("endDate"));
        assert!(!errors.field_errors().contains_key("lessees"));
    }

    #[test]
    fn create_lease_consistency_requires_a_lessee() {
        let json = r#"{ "startDate": "2025-06-01", "lessees": [] }"#;
        let payload: CreateLeasePayload = serde_json::from_str(json).unwrap();
        let errors = payload.validate_consistency().unwrap_err();
        assert!(errors.field_errors().contains_key("lessees"));
        assert!(!errors.field_errors().contains_key("endDate"));
    }

    #[test]
    fn status_change_payload_merges_extra_fields() {
        let json = r#"{
            "status": "VOIDED",
            "voidedReason": "tenant change",
            "monthlyRent": 1800.00
        }"#;
        let payload: ChangeStatusPayload = serde_json::from_str(json).unwrap();
        assert_eq!(
            payload.fields.voided_reason,
            Some(Some("tenant change".to_string()))
        );
        assert!(payload.fields.monthly_rent.is_some());
    }

    #[test]
    fn status_change_distinguishes_absent_from_null_voided_reason() {
        // Ausente: o motivo antigo não é tocado
        let absent: ChangeStatusPayload =
            serde_json::from_str(r#"{ "status": "ACTIVE" }"#).unwrap();
        assert_eq!(absent.fields.voided_reason, None);

        // null explícito: o caller pede para limpar o motivo
        let cleared: ChangeStatusPayload =
            serde_json::from_str(r#"{ "status": "ACTIVE", "voidedReason": null }"#).unwrap();
        assert_eq!(cleared.fields.voided_reason, Some(None));
    }
}
