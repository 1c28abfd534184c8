// src/handlers/persons.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::person::{CreatePersonPayload, Person},
};

// POST /api/persons
#[utoipa::path(
    post,
    path = "/api/persons",
    tag = "Persons",
    request_body = CreatePersonPayload,
    responses(
        (status = 201, description = "Pessoa criada", body = Person)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_person(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePersonPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let person = app_state
        .person_service
        .create_person(user.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(person)))
}

// GET /api/persons
#[utoipa::path(
    get,
    path = "/api/persons",
    tag = "Persons",
    responses(
        (status = 200, description = "Pessoas do usuário", body = [Person])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_persons(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Person>>, AppError> {
    let persons = app_state.person_service.list_persons(user.id).await?;
    Ok(Json(persons))
}
