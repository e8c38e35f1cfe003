//! Shared harness for HTTP integration tests.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use cadence::adapters::http::{build_router, AppState};
use cadence::adapters::sqlite::{
    create_migrated_test_pool, SqliteLabelRepository, SqliteRelationshipRepository,
    SqliteUserRepository,
};
use cadence::domain::models::{Label, Relationship, Role, User};
use cadence::domain::ports::{LabelRepository, RelationshipRepository, UserRepository};

pub const LEADER_TOKEN: &str = "leader-token";
pub const IC_TOKEN: &str = "ic-token";
pub const OUTSIDER_TOKEN: &str = "outsider-token";

pub struct TestApp {
    pub router: Router,
    pub leader_id: Uuid,
    pub ic_id: Uuid,
    pub label_id: Uuid,
}

/// Build a router over a fresh in-memory database seeded with a leader/IC
/// pair, an unrelated outsider, and one shared label.
pub async fn spawn_app() -> TestApp {
    let pool = create_migrated_test_pool().await.unwrap();

    let users = SqliteUserRepository::new(pool.clone());
    let leader = User::new("Lead", "lead@example.com", Role::Leader);
    let ic = User::new("Report", "report@example.com", Role::Ic);
    let outsider = User::new("Other", "other@example.com", Role::Leader);
    users.create(&leader).await.unwrap();
    users.create(&ic).await.unwrap();
    users.create(&outsider).await.unwrap();
    users.set_token(leader.id, LEADER_TOKEN).await.unwrap();
    users.set_token(ic.id, IC_TOKEN).await.unwrap();
    users.set_token(outsider.id, OUTSIDER_TOKEN).await.unwrap();

    let relationships = SqliteRelationshipRepository::new(pool.clone());
    relationships
        .create(&Relationship::new(leader.id, ic.id))
        .await
        .unwrap();

    let labels = SqliteLabelRepository::new(pool.clone());
    let label = Label::new("growth", "#22c55e");
    labels.create(&label).await.unwrap();

    TestApp {
        router: build_router(AppState::new(pool), false),
        leader_id: leader.id,
        ic_id: ic.id,
        label_id: label.id,
    }
}

/// Fire one request at the router and decode the JSON body.
pub async fn send(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Unwrap the `{success, data}` envelope of a 2xx response.
pub fn data(body: &Value) -> &Value {
    assert_eq!(body["success"], Value::Bool(true), "body: {body}");
    &body["data"]
}

/// The error code of a failure response.
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
