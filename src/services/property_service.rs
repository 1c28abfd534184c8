// src/services/property_service.rs

use crate::{
    common::error::AppError,
    db::PropertyRepository,
    models::property::{CreatePropertyPayload, Property, UpdatePropertyPayload},
};
use uuid::Uuid;

// CRUD fino de imóveis: nada além de repasse com checagem de existência.
#[derive(Clone)]
pub struct PropertyService {
    property_repo: PropertyRepository,
}

impl PropertyService {
    pub fn new(property_repo: PropertyRepository) -> Self {
        Self { property_repo }
    }

    pub async fn create_property(
        &self,
        user_id: Uuid,
        payload: &CreatePropertyPayload,
    ) -> Result<Property, AppError> {
        self.property_repo.create(user_id, payload).await
    }

    pub async fn get_property(
        &self,
        user_id: Uuid,
        property_id: Uuid,
    ) -> Result<Property, AppError> {
        self.property_repo
            .find_by_id(user_id, property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found.".to_string()))
    }

    pub async fn list_properties(&self, user_id: Uuid) -> Result<Vec<Property>, AppError> {
        self.property_repo.list_for_user(user_id).await
    }

    pub async fn update_property(
        &self,
        user_id: Uuid,
        property_id: Uuid,
        payload: &UpdatePropertyPayload,
    ) -> Result<Property, AppError> {
        self.property_repo
            .update(user_id, property_id, payload)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found.".to_string()))
    }

    pub async fn delete_property(&self, user_id: Uuid, property_id: Uuid) -> Result<(), AppError> {
        let deleted = self.property_repo.soft_delete(user_id, property_id).await?;
        if !deleted {
            return Err(AppError::NotFound("Property not found.".to_string()));
        }
        Ok(())
    }
}
