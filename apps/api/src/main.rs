//! Warden API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use warden_application::{
    IdentityProvider, OrganizationService, PredefinedCatalog, RoleAccessService,
    SessionTokenService, SignInService,
};
use warden_core::{ActorIdentity, AppError};
use warden_infrastructure::{
    DisabledIdentityProvider, Hs256SessionTokenCodec, PasswordIdentityProvider,
    PostgresAccessRegistryRepository, PostgresMemberRepository, PostgresOrganizationRepository,
};

use crate::api_config::{ApiCommand, ApiConfig, IdentityProviderKind, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let session_token_service = SessionTokenService::new(
        Arc::new(Hs256SessionTokenCodec::new(&config.session_token_secret)?),
        config.token_settings,
    );

    if let ApiCommand::ServiceToken {
        member_id,
        permissions,
    } = &config.command
    {
        let permissions = permissions
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect();
        let token = session_token_service.issue_non_expiring(*member_id, permissions)?;
        println!("{token}");
        return Ok(());
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url()?)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.command == ApiCommand::Migrate {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let registry_repository = Arc::new(PostgresAccessRegistryRepository::new(pool.clone()));
    let organization_repository = Arc::new(PostgresOrganizationRepository::new(pool.clone()));
    let member_repository = Arc::new(PostgresMemberRepository::new(pool));

    let identity_provider: Arc<dyn IdentityProvider> = match config.identity_provider {
        IdentityProviderKind::Password => {
            Arc::new(PasswordIdentityProvider::new(member_repository.clone()))
        }
        IdentityProviderKind::Disabled => {
            warn!("interactive sign-in is disabled; only service tokens are accepted");
            Arc::new(DisabledIdentityProvider)
        }
    };

    let role_access_service = RoleAccessService::new(registry_repository.clone());
    let organization_service = OrganizationService::new(
        organization_repository.clone(),
        registry_repository,
        member_repository.clone(),
    );
    let sign_in_service = SignInService::new(
        identity_provider,
        member_repository,
        organization_repository,
        session_token_service.clone(),
    );

    let summary = role_access_service
        .seed_predefined(&ActorIdentity::system(), &PredefinedCatalog::system())
        .await?;
    info!(
        permissions_created = summary.permissions_created,
        roles_created = summary.roles_created,
        "predefined registry entries ensured"
    );

    let app_state = AppState {
        role_access_service,
        organization_service,
        session_token_service,
        sign_in_service,
    };

    let app = api_router::build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "warden-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
