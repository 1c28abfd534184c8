// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Persons ---
        handlers::persons::create_person,
        handlers::persons::list_persons,

        // --- Properties ---
        handlers::properties::create_property,
        handlers::properties::list_properties,
        handlers::properties::get_property,
        handlers::properties::update_property,
        handlers::properties::delete_property,

        // --- Leases ---
        handlers::leases::create_lease,
        handlers::leases::list_leases,
        handlers::leases::get_lease,
        handlers::leases::change_lease_status,
        handlers::leases::add_lessee,
        handlers::leases::remove_lessee,
        handlers::leases::add_occupant,
        handlers::leases::remove_occupant,
        handlers::leases::add_pet,
        handlers::leases::remove_pet,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Persons ---
            models::person::Person,
            models::person::PersonRef,
            models::person::CreatePersonPayload,

            // --- Properties ---
            models::property::Property,
            models::property::CreatePropertyPayload,
            models::property::UpdatePropertyPayload,

            // --- Leases ---
            models::lease::LeaseStatus,
            models::lease::PetSpecies,
            models::lease::Lease,
            models::lease::LeaseLessee,
            models::lease::LeaseOccupant,
            models::lease::LeasePet,
            models::lease::LesseeDetail,
            models::lease::OccupantDetail,
            models::lease::LeaseWithDetails,
            models::lease::LesseeInput,
            models::lease::NewLeaseTerms,
            models::lease::StatusChangeFields,
            models::lease::NewLeaseResponse,

            // --- Payloads ---
            handlers::leases::CreateLeasePayload,
            handlers::leases::ChangeStatusPayload,
            handlers::leases::AddLesseePayload,
            handlers::leases::RemoveLesseePayload,
            handlers::leases::AddOccupantPayload,
            handlers::leases::AddPetPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Persons", description = "Registros de Identidade (referenciados por contratos)"),
        (name = "Properties", description = "Gestão de Imóveis"),
        (name = "Leases", description = "Contratos de Locação: status, ocupantes, pets e versionamento de locatários")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
