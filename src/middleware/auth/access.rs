//! Request-time enforcement of the chain registry.
//!
//! - Path outside every zone: passed through untouched (default Allow)
//! - `Deny`: 403 before credentials are even looked at
//! - `Authenticated`: Basic credentials → identity service → privilege checks,
//!   then `AuthCtx` goes into the request extensions
//!
//! Governed zones are stateless: no session is created and any `Set-Cookie`
//! produced downstream is dropped from the response.

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use super::basic;
use crate::api::idm::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::security::{Requirement, SessionPolicy};
use crate::state::AppState;

/// Put the gate in front of every route of `router`, including its fallback.
///
/// ```ignore
/// let app = Router::new().merge(api::idm::routes()).route("/health", get(health));
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = original_uri.path();

    let Some(chain) = state.registry.select(path) else {
        return Ok(next.run(req).await);
    };
    let zone = chain.zone().name.as_str();

    match chain.requirement(path) {
        Requirement::Deny => {
            tracing::warn!(zone, path, "request denied by zone policy");
            return Err(AppError::forbidden("access denied"));
        }
        Requirement::Permit => {}
        Requirement::Authenticated { privileges } => {
            let Some(credentials) = basic::credentials(req.headers()) else {
                tracing::warn!(zone, path, "missing or malformed credentials");
                return Err(AppError::Unauthorized);
            };

            let Some(principal) = state.identity.authenticate(&credentials).await? else {
                tracing::warn!(zone, path, user_id = %credentials.user_id, "authentication failed");
                return Err(AppError::Unauthorized);
            };

            for privilege in &privileges {
                if !state.identity.has_privilege(&principal, privilege).await? {
                    tracing::warn!(
                        zone,
                        path,
                        user_id = %principal.id,
                        privilege = %privilege,
                        "missing privilege"
                    );
                    return Err(AppError::forbidden("missing privilege"));
                }
            }

            req.extensions_mut().insert(AuthCtx::from(principal));
        }
    }

    let mut response = next.run(req).await;

    match chain.session_policy() {
        SessionPolicy::Stateless => {
            if response.headers_mut().remove(header::SET_COOKIE).is_some() {
                tracing::debug!(zone, path, "set-cookie stripped from stateless zone response");
            }
        }
    }

    Ok(response)
}
