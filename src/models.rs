// src/models.rs

pub mod auth;
pub mod lease;
pub mod person;
pub mod property;
