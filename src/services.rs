// src/services.rs

pub mod auth;
pub mod lease_service;
pub mod lease_status;
pub mod person_service;
pub mod property_service;
