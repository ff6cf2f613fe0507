//! CORS policy for browser clients of the IDM API.
//!
//! The API is credential-per-request and stateless, so credentials mode
//! (cookies) is never allowed.
//!
//! - Development: any origin
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`; an empty
//!   list emits no CORS headers at all

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router, config: &Config) -> Router {
    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new().allow_origin(allow_origin)
    } else {
        CorsLayer::new().allow_origin(Any)
    }
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers([
        header::AUTHORIZATION,
        header::ACCEPT,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ])
    .expose_headers([
        header::WWW_AUTHENTICATE,
        HeaderName::from_static(REQUEST_ID_HEADER),
    ])
    .max_age(Duration::from_secs(60 * 10));

    router.layer(cors)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    fn production(origins: &str) -> Config {
        Config::from_lookup(|key| match key {
            "APP_ENV" => Some("production".to_string()),
            "CORS_ALLOWED_ORIGINS" => Some(origins.to_string()),
            _ => None,
        })
        .unwrap()
    }

    async fn allow_origin_for(config: &Config, origin: &str) -> Option<HeaderValue> {
        let app = apply(Router::new().route("/health", get(|| async { "ok" })), config);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn production_allows_only_listed_origins() {
        let config = production("https://idm.example.com");

        assert_eq!(
            allow_origin_for(&config, "https://idm.example.com").await.unwrap(),
            "https://idm.example.com"
        );
        assert!(allow_origin_for(&config, "https://evil.example.com").await.is_none());
    }

    #[tokio::test]
    async fn production_with_empty_allowlist_emits_no_cors_headers() {
        let config = production("");
        assert!(allow_origin_for(&config, "https://idm.example.com").await.is_none());
    }
}
