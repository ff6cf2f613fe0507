use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::get as route_get,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use tower::ServiceExt;

use idm_gate::app::{build_router, build_state};
use idm_gate::config::{Config, ConfigError};
use idm_gate::middleware;
use idm_gate::services::identity::{
    IdentityStore, InMemoryIdentityStore, UserDetailsService, UserRecord,
};
use idm_gate::services::security::{
    ChainBuilder, ChainRegistry, Customizers, FeatureFlags, GateError, HookError, Privilege,
    SecurityZone,
};
use idm_gate::state::AppState;

const USERS: &str = "admin:test:ACCESS_REST_API,kermit:kermit:,root:root:ACCESS_REST_API+ACCESS_ADMIN";

fn config(extra: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let mut vars = vec![("IDM_USERS", USERS)];
    vars.extend_from_slice(extra);
    Config::from_lookup(|key| {
        vars.iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
}

fn app(extra: &[(&str, &str)]) -> Router {
    let config = config(extra).unwrap();
    let state = build_state(&config, Customizers::new()).unwrap();
    build_router(state, &config)
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn get(uri: &str, auth: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[derive(Clone, Default)]
struct SpyHook {
    calls: Arc<AtomicUsize>,
}

impl SpyHook {
    fn hooks(&self) -> Customizers {
        let calls = self.calls.clone();
        Customizers::new().with(move |_: &mut ChainBuilder| -> Result<(), HookError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

#[tokio::test]
async fn disabled_rest_api_denies_everyone_and_never_runs_the_hook() {
    let spy = SpyHook::default();
    let config = config(&[("IDM_REST_ENABLED", "false")]).unwrap();
    let state = build_state(&config, spy.hooks()).unwrap();
    assert_eq!(
        state.registry.decide("/api/idm/users"),
        Some(idm_gate::services::security::PolicyDecision::DenyAll)
    );
    let app = build_router(state, &config);

    let response = app
        .oneshot(get("/api/idm/users", Some(basic("admin", "test"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json(response).await["error"]["code"], "FORBIDDEN");
    assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn enabled_rest_api_runs_the_hook_once_per_zone() {
    let spy = SpyHook::default();
    let config = config(&[("IDM_SECURITY_ZONES", "idm=/api/idm/**@10,admin=/api/admin/**@20")]).unwrap();
    build_state(&config, spy.hooks()).unwrap();

    assert_eq!(spy.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn privileged_principal_proceeds() {
    let response = app(&[])
        .oneshot(get("/api/idm/users", Some(basic("admin", "test"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["admin", "kermit", "root"]);
    assert!(body[0].get("password").is_none());
}

#[tokio::test]
async fn principal_without_rest_privilege_is_forbidden() {
    let response = app(&[])
        .oneshot(get("/api/idm/users", Some(basic("kermit", "kermit"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_unauthorized() {
    let app = app(&[]);

    for auth in [None, Some(basic("admin", "wrong")), Some("Bearer abc".to_string())] {
        let response = app
            .clone()
            .oneshot(get("/api/idm/users", auth))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"idm\""
        );
    }
}

#[tokio::test]
async fn authentication_only_mode_admits_any_principal() {
    let response = app(&[("IDM_VERIFY_REST_API_PRIVILEGE", "false")])
        .oneshot(get("/api/idm/account", Some(basic("kermit", "kermit"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["id"], "kermit");
    assert_eq!(body["privileges"], serde_json::json!([]));
}

#[tokio::test]
async fn paths_outside_every_zone_fall_through() {
    let response = app(&[("IDM_REST_ENABLED", "false")])
        .oneshot(get("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_inside_a_zone_is_gated_before_routing() {
    let app = app(&[]);

    let response = app
        .clone()
        .oneshot(get("/api/idm/nothing-here", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get("/api/idm/nothing-here", Some(basic("admin", "test"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn configured_privilege_rules_only_tighten() {
    let app = app(&[("IDM_API_PRIVILEGE_RULES", "/api/idm/users/**=ACCESS_ADMIN")]);

    let response = app
        .clone()
        .oneshot(get("/api/idm/users/kermit", Some(basic("admin", "test"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/idm/privileges", Some(basic("admin", "test"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/idm/users/kermit", Some(basic("root", "root"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["id"], "kermit");
}

#[tokio::test]
async fn missing_user_is_not_found_after_the_gate() {
    let response = app(&[])
        .oneshot(get("/api/idm/users/ghost", Some(basic("admin", "test"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn denial_is_identical_on_every_retry() {
    let app = app(&[]);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(get("/api/idm/users", Some(basic("kermit", "kermit"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn duplicate_zone_orders_abort_startup() {
    let config = config(&[("IDM_SECURITY_ZONES", "idm=/api/idm/**@10,admin=/api/admin/**@10")]).unwrap();
    let err = build_state(&config, Customizers::new()).err().unwrap();

    assert!(matches!(err, GateError::DuplicateOrder { order: 10, .. }));
}

#[tokio::test]
async fn bad_privilege_rule_pattern_aborts_startup() {
    let config = config(&[("IDM_API_PRIVILEGE_RULES", "users/**=ACCESS_ADMIN")]).unwrap();
    let err = build_state(&config, Customizers::new()).err().unwrap();

    assert!(matches!(err, GateError::Hook { .. }));
}

async fn sets_cookie() -> impl IntoResponse {
    ([(header::SET_COOKIE, "SESSION=abc; Path=/")], "ok")
}

#[tokio::test]
async fn stateless_zones_never_leak_a_session_cookie() {
    let directory: Arc<dyn IdentityStore> = Arc::new(InMemoryIdentityStore::new([
        UserRecord::new("admin", "test", [Privilege::new("ACCESS_REST_API")]),
    ]));
    let identity = Arc::new(UserDetailsService::new(
        directory.clone(),
        std::time::Duration::from_secs(30),
    ));
    let registry = ChainRegistry::builder(FeatureFlags::default())
        .zone(SecurityZone::new("idm", "/api/idm/**", 10))
        .build(&Customizers::new())
        .unwrap();
    let state = AppState::new(Arc::new(registry), identity, directory);

    let router = Router::new()
        .route("/api/idm/login", route_get(sets_cookie))
        .route("/public/login", route_get(sets_cookie));
    let app = middleware::auth::access::apply(router, state.clone()).with_state(state);

    let governed = app
        .clone()
        .oneshot(get("/api/idm/login", Some(basic("admin", "test"))))
        .await
        .unwrap();
    assert_eq!(governed.status(), StatusCode::OK);
    assert!(governed.headers().get(header::SET_COOKIE).is_none());

    let ungoverned = app.oneshot(get("/public/login", None)).await.unwrap();
    assert!(ungoverned.headers().get(header::SET_COOKIE).is_some());
}
