/*
 * Responsibility
 * - URL layout of the IDM API surface
 * - Access control is not applied here; the gate in middleware::auth wraps
 *   the whole router and decides by path
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::idm::handlers::{
    account::get_account,
    privileges::list_privileges,
    users::{get_user, list_users},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(get_account))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/privileges", get(list_privileges))
}
