// src/handlers.rs

pub mod auth;
pub mod leases;
pub mod persons;
pub mod properties;
