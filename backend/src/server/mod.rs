//! Server construction and wiring.
//!
//! Builds the port implementations (database-backed when a pool is
//! configured, in-memory otherwise), assembles the actix application, and
//! runs it. Handlers receive their dependencies through [`HttpState`]; no
//! global registry exists.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{MatchmakingService, UserDirectoryService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::relationships::{list_relationships, update_relationship};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::{create_user, list_users};
use crate::outbound::persistence::{
    DbPool, DieselRelationshipStore, DieselUserRepository, MemoryRelationshipStore,
    MemoryUserRepository, PoolConfig,
};

/// Build the HTTP state from configuration.
///
/// Uses Diesel-backed adapters when a database URL is configured; otherwise
/// falls back to in-memory storage, which keeps no data across restarts.
pub async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    match config.database_url() {
        Some(url) => {
            let pool = DbPool::new(
                PoolConfig::new(url).with_max_size(config.pool_size()),
            )
            .await
            .map_err(|err| std::io::Error::other(format!("database pool setup failed: {err}")))?;

            let matchmaking = Arc::new(MatchmakingService::new(Arc::new(
                DieselRelationshipStore::new(pool.clone()),
            )));
            let directory = Arc::new(UserDirectoryService::new(Arc::new(
                DieselUserRepository::new(pool),
            )));
            Ok(HttpState::new(
                directory.clone(),
                directory,
                matchmaking.clone(),
                matchmaking,
            ))
        }
        None => {
            warn!("no database configured, falling back to in-memory storage");
            let matchmaking = Arc::new(MatchmakingService::new(Arc::new(
                MemoryRelationshipStore::new(),
            )));
            let directory = Arc::new(UserDirectoryService::new(Arc::new(
                MemoryUserRepository::new(),
            )));
            Ok(HttpState::new(
                directory.clone(),
                directory,
                matchmaking.clone(),
                matchmaking,
            ))
        }
    }
}

/// Assemble the actix application from prepared state.
pub fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .app_data(health_state)
        .service(list_users)
        .service(create_user)
        .service(list_relationships)
        .service(update_relationship)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Run the HTTP server until shutdown.
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let http_state = web::Data::new(build_http_state(&config).await?);
    let health_state = web::Data::new(HealthState::new());

    let server_http_state = http_state.clone();
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_http_state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr())?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr(), "matchwire listening");
    server.run().await
}
