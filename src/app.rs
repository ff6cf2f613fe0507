/*
 * Responsibility
 * - Config → identity collaborator → chain registry → Router
 * - The registry is built exactly once here; any fault aborts startup
 * - axum::serve() with the gate, CORS and transport layers applied
 */
use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    api::idm::handlers::health::health,
    config::Config,
    middleware,
    services::identity::{IdentityStore, InMemoryIdentityStore, UserDetailsService},
    services::security::{
        ChainRegistry, CustomizationHook, Customizers, GateError, PrivilegeRulesHook,
    },
    state::AppState,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let state = build_state(&config, Customizers::new())?;
    let app = build_router(state, &config);

    tracing::info!(addr = %config.addr, "idm gate listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Wire the collaborators and finalize every chain.
///
/// Privilege rules from configuration run before the caller's `hooks`.
pub fn build_state(config: &Config, hooks: Customizers) -> Result<AppState, GateError> {
    let store = InMemoryIdentityStore::new(config.users.iter().cloned());
    if store.is_empty() {
        tracing::warn!("IDM_USERS is empty; every authenticated request will be rejected");
    } else {
        tracing::info!(users = store.len(), "identity store seeded");
    }

    let directory: Arc<dyn IdentityStore> = Arc::new(store);
    let identity = Arc::new(UserDetailsService::new(
        directory.clone(),
        config.user_validity_period,
    ));

    let hooks = Customizers::new()
        .with(PrivilegeRulesHook::new(config.privilege_rules.clone()))
        .with(hooks);
    let registry = build_registry(config, &hooks)?;

    Ok(AppState::new(Arc::new(registry), identity, directory))
}

pub fn build_registry(
    config: &Config,
    hook: &dyn CustomizationHook,
) -> Result<ChainRegistry, GateError> {
    config
        .zones
        .iter()
        .cloned()
        .fold(ChainRegistry::builder(config.feature_flags), |builder, zone| {
            builder.zone(zone)
        })
        .build(hook)
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api/idm", api::idm::routes());

    let app = middleware::auth::access::apply(app, state.clone()).with_state(state);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app, config)
}
