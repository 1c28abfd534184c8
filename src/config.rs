// src/config.rs

use crate::{
    db::{LeaseRepository, PersonRepository, PropertyRepository, UserRepository},
    services::{
        auth::AuthService, lease_service::LeaseService, person_service::PersonService,
        property_service::PropertyService,
    },
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub auth_service: AuthService,
    pub person_service: PersonService,
    pub property_service: PropertyService,
    pub lease_service: LeaseService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem decide
    // o que fazer é o main.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let person_repo = PersonRepository::new(db_pool.clone());
        let property_repo = PropertyRepository::new(db_pool.clone());
        let lease_repo = LeaseRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret.clone());
        let person_service = PersonService::new(person_repo);
        let property_service = PropertyService::new(property_repo.clone());
        let lease_service = LeaseService::new(
            lease_repo,
            property_repo,
            person_service.clone(),
            db_pool.clone(),
        );

        // Retorna Ok com o estado montado
        Ok(Self {
            db_pool,
            jwt_secret,
            auth_service,
            person_service,
            property_service,
            lease_service,
        })
    }
}
