//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Lida com o Result retornado por AppState::new()
    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let person_routes = Router::new()
        .route(
            "/",
            post(handlers::persons::create_person).get(handlers::persons::list_persons),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let property_routes = Router::new()
        .route(
            "/",
            post(handlers::properties::create_property).get(handlers::properties::list_properties),
        )
        .route(
            "/{property_id}",
            get(handlers::properties::get_property)
                .put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        // Contratos nascem aninhados no imóvel
        .route(
            "/{property_id}/leases",
            post(handlers::leases::create_lease).get(handlers::leases::list_leases),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let lease_routes = Router::new()
        .route("/{lease_id}", get(handlers::leases::get_lease))
        // Máquina de estados (sem versionamento)
        .route(
            "/{lease_id}/status",
            patch(handlers::leases::change_lease_status),
        )
        // Motor de versionamento (locatários)
        .route("/{lease_id}/lessees", post(handlers::leases::add_lessee))
        .route(
            "/{lease_id}/lessees/{person_id}",
            delete(handlers::leases::remove_lessee),
        )
        // Mutações in-place (ocupantes e pets)
        .route("/{lease_id}/occupants", post(handlers::leases::add_occupant))
        .route(
            "/{lease_id}/occupants/{occupant_id}",
            delete(handlers::leases::remove_occupant),
        )
        .route("/{lease_id}/pets", post(handlers::leases::add_pet))
        .route(
            "/{lease_id}/pets/{pet_id}",
            delete(handlers::leases::remove_pet),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/persons", person_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/leases", lease_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
