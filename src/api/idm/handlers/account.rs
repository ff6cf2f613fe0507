/*
 * Responsibility
 * - GET /api/idm/account: who the gate let through
 */
use axum::Json;

use crate::api::idm::dto::account::AccountResponse;
use crate::api::idm::extractors::AuthCtxExtractor;

pub async fn get_account(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<AccountResponse> {
    Json(ctx.into())
}
