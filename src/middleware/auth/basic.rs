//! `Authorization: Basic <base64(id:password)>` parsing.
//!
//! Only extracts the pair. Whether it identifies a user is the identity
//! service's call.
use axum::http::{HeaderMap, header};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::services::identity::Credentials;

pub fn credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user_id, password) = decoded.split_once(':')?;

    Some(Credentials {
        user_id: user_id.to_string(),
        password: password.to_string(),
    })
}
