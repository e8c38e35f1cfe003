//! End-to-end tests for the REST surface: auth, envelopes, status mapping,
//! and the topic/meeting lifecycle as a client drives it.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{data, error_code, send, spawn_app, IC_TOKEN, LEADER_TOKEN, OUTSIDER_TOKEN};

fn future() -> String {
    (Utc::now() + Duration::days(1)).to_rfc3339()
}

async fn create_topic(app: &common::TestApp, token: &str, title: &str) -> Value {
    let (status, body) = send(
        &app.router,
        "POST",
        "/topics",
        Some(token),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    data(&body).clone()
}

async fn create_meeting(app: &common::TestApp) -> Value {
    let (status, body) = send(
        &app.router,
        "POST",
        "/meetings",
        Some(LEADER_TOKEN),
        Some(json!({ "icId": app.ic_id, "scheduledAt": future() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    data(&body).clone()
}

async fn attach(app: &common::TestApp, meeting_id: &str, topic_id: &str) -> StatusCode {
    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/meetings/{meeting_id}/topics"),
        Some(IC_TOKEN),
        Some(json!({ "topicId": topic_id })),
    )
    .await;
    status
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, "GET", "/topics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");

    let (status, _) = send(&app.router, "GET", "/topics", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_topic_crud_and_envelope() {
    let app = spawn_app().await;

    let topic = create_topic(&app, IC_TOKEN, "Growth plan").await;
    assert_eq!(topic["status"], "backlog");
    assert_eq!(topic["sortOrder"], 0);
    let id = topic["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/topics/{id}"),
        Some(IC_TOKEN),
        Some(json!({ "title": "Growth plan v2", "labelId": app.label_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["title"], "Growth plan v2");

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/topics/{id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["meetingTopics"], json!([]));

    // Empty title is a validation error
    let (status, body) = send(
        &app.router,
        "POST",
        "/topics",
        Some(IC_TOKEN),
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/topics/{id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/topics/{id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_attach_detach_round_trip() {
    let app = spawn_app().await;
    let topic = create_topic(&app, IC_TOKEN, "Roadmap").await;
    let topic_id = topic["id"].as_str().unwrap();
    let meeting = create_meeting(&app).await;
    let meeting_id = meeting["id"].as_str().unwrap();

    assert_eq!(attach(&app, meeting_id, topic_id).await, StatusCode::CREATED);

    // Scheduled topics are neither deletable nor attachable elsewhere
    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/topics/{topic_id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "INVALID_STATE");

    let other = create_meeting(&app).await;
    assert_eq!(
        attach(&app, other["id"].as_str().unwrap(), topic_id).await,
        StatusCode::CONFLICT
    );

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/meetings/{meeting_id}/topics/{topic_id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app.router,
        "GET",
        &format!("/topics/{topic_id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(data(&body)["status"], "backlog");
    assert_eq!(data(&body)["meetingTopics"], json!([]));
}

#[tokio::test]
async fn test_complete_meeting_discusses_topics() {
    let app = spawn_app().await;
    let meeting = create_meeting(&app).await;
    let meeting_id = meeting["id"].as_str().unwrap();

    let mut topic_ids = Vec::new();
    for title in ["One", "Two", "Three"] {
        let topic = create_topic(&app, IC_TOKEN, title).await;
        let id = topic["id"].as_str().unwrap().to_string();
        assert_eq!(attach(&app, meeting_id, &id).await, StatusCode::CREATED);
        topic_ids.push(id);
    }

    // Resolve one agenda entry before the meeting happens
    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/meetings/{meeting_id}/topics/{}", topic_ids[0]),
        Some(LEADER_TOKEN),
        Some(json!({ "resolution": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/meetings/{meeting_id}/complete"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["status"], "completed");
    assert_eq!(data(&body)["unresolvedTopics"], 2);

    for id in &topic_ids {
        let (_, body) = send(
            &app.router,
            "GET",
            &format!("/topics/{id}"),
            Some(IC_TOKEN),
            None,
        )
        .await;
        assert_eq!(data(&body)["status"], "discussed");
    }

    // Completing twice is an invalid state
    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/meetings/{meeting_id}/complete"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "INVALID_STATE");
}

#[tokio::test]
async fn test_cancel_meeting_reverts_topics() {
    let app = spawn_app().await;
    let meeting = create_meeting(&app).await;
    let meeting_id = meeting["id"].as_str().unwrap();

    let a = create_topic(&app, IC_TOKEN, "First").await;
    let b = create_topic(&app, IC_TOKEN, "Second").await;
    for topic in [&a, &b] {
        let id = topic["id"].as_str().unwrap();
        assert_eq!(attach(&app, meeting_id, id).await, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app.router,
        "DELETE",
        &format!("/meetings/{meeting_id}"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["status"], "cancelled");

    for topic in [&a, &b] {
        let id = topic["id"].as_str().unwrap();
        let (_, body) = send(
            &app.router,
            "GET",
            &format!("/topics/{id}"),
            Some(IC_TOKEN),
            None,
        )
        .await;
        assert_eq!(data(&body)["status"], "backlog");
    }
}

#[tokio::test]
async fn test_generate_meetings_and_listing() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/meetings/generate",
        Some(LEADER_TOKEN),
        Some(json!({
            "icId": app.ic_id,
            "frequency": "weekly",
            "dayOfWeek": 1,
            "time": "10:00",
            "count": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(data(&body).as_array().unwrap().len(), 3);

    let (status, body) = send(&app.router, "GET", "/meetings", Some(IC_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    let upcoming = data(&body)["upcoming"].as_array().unwrap().clone();
    assert_eq!(upcoming.len(), 3);
    assert_eq!(upcoming[0]["isNext"], true);
    assert_eq!(upcoming[1]["isNext"], false);

    // Outsiders see nothing
    let (_, body) = send(&app.router, "GET", "/meetings", Some(OUTSIDER_TOKEN), None).await;
    assert!(data(&body)["upcoming"].as_array().unwrap().is_empty());

    // Bad generator input is a validation error
    let (status, body) = send(
        &app.router,
        "POST",
        "/meetings/generate",
        Some(LEADER_TOKEN),
        Some(json!({
            "icId": app.ic_id,
            "frequency": "daily",
            "dayOfWeek": 1,
            "time": "10:00",
            "count": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_meeting_notes_round_trip() {
    let app = spawn_app().await;
    let meeting = create_meeting(&app).await;
    let meeting_id = meeting["id"].as_str().unwrap();

    let (status, body) = send(
        &app.router,
        "GET",
        &format!("/meetings/{meeting_id}/notes"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body), &Value::Null);

    let content = json!([{ "type": "paragraph", "text": "agenda prep" }]);
    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/meetings/{meeting_id}/notes"),
        Some(IC_TOKEN),
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["content"], content);
    assert_eq!(data(&body)["lastEditedBy"], json!(app.ic_id));

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/meetings/{meeting_id}/complete"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Notes freeze once the meeting is completed
    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/meetings/{meeting_id}/notes"),
        Some(LEADER_TOKEN),
        Some(json!({ "content": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "INVALID_STATE");
}

#[tokio::test]
async fn test_promote_thought_end_to_end() {
    let app = spawn_app().await;

    let content = json!([{ "type": "paragraph", "text": "comp discussion" }]);
    let (status, body) = send(
        &app.router,
        "POST",
        "/thoughts",
        Some(IC_TOKEN),
        Some(json!({ "title": "Ask about raise", "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let thought_id = data(&body)["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/thoughts/{thought_id}/promote"),
        Some(IC_TOKEN),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(data(&body)["thoughtDeleted"], true);
    assert_eq!(data(&body)["topic"]["title"], "Ask about raise");
    assert_eq!(data(&body)["topic"]["content"], content);
    assert_eq!(data(&body)["topic"]["status"], "backlog");

    // Source thought is gone
    let (status, _) = send(
        &app.router,
        "GET",
        &format!("/thoughts/{thought_id}"),
        Some(IC_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_counterparty_privacy_over_http() {
    let app = spawn_app().await;

    let private = create_topic(&app, IC_TOKEN, "Private thought").await;
    let shared = create_topic(&app, IC_TOKEN, "Shared history").await;
    let shared_id = shared["id"].as_str().unwrap();

    let meeting = create_meeting(&app).await;
    let meeting_id = meeting["id"].as_str().unwrap();
    assert_eq!(attach(&app, meeting_id, shared_id).await, StatusCode::CREATED);
    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/meetings/{meeting_id}/complete"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        "GET",
        "/topics?includeCounterparty=true",
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = data(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert!(titles.contains(&"Shared history"));
    assert!(!titles.contains(&"Private thought"));

    // Direct fetch of the private topic also reads as not-found
    let private_id = private["id"].as_str().unwrap();
    let (status, _) = send(
        &app.router,
        "GET",
        &format!("/topics/{private_id}"),
        Some(LEADER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_labels_and_relationships() {
    let app = spawn_app().await;

    let (status, body) = send(&app.router, "GET", "/labels", Some(IC_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)[0]["name"], "growth");

    let (status, body) = send(&app.router, "GET", "/relationships", Some(IC_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    let relationships = data(&body).as_array().unwrap();
    assert_eq!(relationships.len(), 1);
    assert_eq!(relationships[0]["counterpartyId"], json!(app.leader_id));

    let (_, body) = send(&app.router, "GET", "/relationships", Some(OUTSIDER_TOKEN), None).await;
    assert!(data(&body).as_array().unwrap().is_empty());
}
