/*
 * Responsibility
 * - GET /api/idm/privileges: the well-known privilege identifiers
 */
use axum::Json;

use crate::api::idm::dto::users::PrivilegeResponse;
use crate::services::security::DefaultPrivileges;

pub async fn list_privileges() -> Json<Vec<PrivilegeResponse>> {
    Json(
        DefaultPrivileges::ALL
            .into_iter()
            .map(|id| PrivilegeResponse { id })
            .collect(),
    )
}
