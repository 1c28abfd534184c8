// src/handlers/properties.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::property::{CreatePropertyPayload, Property, UpdatePropertyPayload},
};

// POST /api/properties
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = CreatePropertyPayload,
    responses(
        (status = 201, description = "Imóvel criado", body = Property)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreatePropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state
        .property_service
        .create_property(user.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(property)))
}

// GET /api/properties
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    responses(
        (status = 200, description = "Imóveis do usuário", body = [Property])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Property>>, AppError> {
    let properties = app_state.property_service.list_properties(user.id).await?;
    Ok(Json(properties))
}

// GET /api/properties/{property_id}
#[utoipa::path(
    get,
    path = "/api/properties/{property_id}",
    tag = "Properties",
    params(
        ("property_id" = Uuid, Path, description = "ID do Imóvel")
    ),
    responses(
        (status = 200, description = "Imóvel", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Property>, AppError> {
    let property = app_state
        .property_service
        .get_property(user.id, property_id)
        .await?;
    Ok(Json(property))
}

// PUT /api/properties/{property_id}
#[utoipa::path(
    put,
    path = "/api/properties/{property_id}",
    tag = "Properties",
    request_body = UpdatePropertyPayload,
    params(
        ("property_id" = Uuid, Path, description = "ID do Imóvel")
    ),
    responses(
        (status = 200, description = "Imóvel atualizado", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<Json<Property>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state
        .property_service
        .update_property(user.id, property_id, &payload)
        .await?;
    Ok(Json(property))
}

// DELETE /api/properties/{property_id}
#[utoipa::path(
    delete,
    path = "/api/properties/{property_id}",
    tag = "Properties",
    params(
        ("property_id" = Uuid, Path, description = "ID do Imóvel")
    ),
    responses(
        (status = 204, description = "Imóvel removido"),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .property_service
        .delete_property(user.id, property_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
