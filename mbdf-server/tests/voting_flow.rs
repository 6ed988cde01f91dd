//! End-to-end voting and archival flows over the HTTP surface.
//!
//! Runs the full router (auth middleware included) against an in-memory
//! database, driving it the way a client would.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use mbdf_server::{ServerState, api};

async fn test_app() -> (Router, ServerState) {
    let state = ServerState::in_memory().await.expect("state setup failed");
    (api::build_app(state.clone()), state)
}

fn token_for(state: &ServerState, user_id: i64, name: &str) -> String {
    state
        .jwt_service
        .generate_token(user_id, name)
        .expect("token generation failed")
}

async fn send(
    app: &Router,
    token: &str,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let request = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn ballot_body(room_id: i64, candidate_id: i64, score: f64) -> Value {
    json!({
        "room_id": room_id,
        "candidate_id": candidate_id,
        "technical_score": score,
        "experience_score": score,
        "availability_score": score,
        "communication_score": score,
        "leadership_score": score,
    })
}

/// Create a room as user 1 and add the given user ids as members.
async fn setup_room(app: &Router, state: &ServerState, members: &[i64]) -> i64 {
    let admin = token_for(state, 1, "m1");
    let (status, room) = send(
        app,
        &admin,
        "POST",
        "/rooms",
        Some(json!({"name": "Substance room", "substance_identifier": "200-001-8"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room_id = room["id"].as_i64().unwrap();

    for user_id in members {
        let (status, _) = send(
            app,
            &admin,
            "POST",
            &format!("/rooms/{room_id}/members"),
            Some(json!({"user_id": user_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    room_id
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let (app, _state) = test_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/votes?roomId=1")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // /health stays public
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_end_to_end_voting_scenario() {
    // Members M1..M5; M4 and M5 get nominated, so eligible voters are
    // M1, M2, M3 and the expected ballot total is 3 * 2 = 6.
    let (app, state) = test_app().await;
    let room_id = setup_room(&app, &state, &[2, 3, 4, 5]).await;
    let admin = token_for(&state, 1, "m1");

    let (status, c1) = send(
        &app,
        &admin,
        "POST",
        "/candidates",
        Some(json!({"room_id": room_id, "user_id": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let c1_id = c1["id"].as_i64().unwrap();

    let (status, c2) = send(
        &app,
        &admin,
        "POST",
        "/candidates",
        Some(json!({"room_id": room_id, "user_id": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let c2_id = c2["id"].as_i64().unwrap();

    // Duplicate nomination is a conflict.
    let (status, body) = send(
        &app,
        &admin,
        "POST",
        "/candidates",
        Some(json!({"room_id": room_id, "user_id": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    // M1 and M2 vote via the batch endpoint, M3 one ballot at a time.
    for (user_id, name) in [(1, "m1"), (2, "m2")] {
        let token = token_for(&state, user_id, name);
        let (status, body) = send(
            &app,
            &token,
            "POST",
            "/votes/batch",
            Some(json!({
                "room_id": room_id,
                "ballots": [
                    {"candidate_id": c1_id, "technical_score": 4.0, "experience_score": 4.0,
                     "availability_score": 4.0, "communication_score": 4.0, "leadership_score": 4.0},
                    {"candidate_id": c2_id, "technical_score": 3.0, "experience_score": 3.0,
                     "availability_score": 3.0, "communication_score": 3.0, "leadership_score": 3.0},
                ],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pending");
    }

    let m3 = token_for(&state, 3, "m3");
    let (status, body) = send(&app, &m3, "POST", "/votes", Some(ballot_body(room_id, c1_id, 4.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    // The sixth ballot completes the vote and finalizes server-side.
    let (status, body) = send(&app, &m3, "POST", "/votes", Some(ballot_body(room_id, c2_id, 3.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "finalized");
    assert_eq!(body["selected_candidate_id"].as_i64(), Some(c1_id));

    // The votes view reflects the finalized standings.
    let (status, body) = send(&app, &admin, "GET", &format!("/votes?roomId={room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_finalized"], true);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["candidate_id"].as_i64(), Some(c1_id));
    assert_eq!(results[0]["total_score"].as_f64(), Some(4.0));
    assert_eq!(results[0]["vote_count"].as_i64(), Some(3));
    assert_eq!(results[1]["total_score"].as_f64(), Some(3.0));
    assert!(body["my_vote"].is_object());

    // Candidate list carries the selected flag.
    let (status, body) = send(&app, &admin, "GET", &format!("/candidates?roomId={room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let selected: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["is_selected"] == true)
        .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0]["id"].as_i64(), Some(c1_id));

    // Finalized room accepts no further ballots.
    let (status, _) = send(&app, &m3, "POST", "/votes", Some(ballot_body(room_id, c2_id, 5.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_out_of_range_scores_are_rejected() {
    let (app, state) = test_app().await;
    let room_id = setup_room(&app, &state, &[2, 4]).await;
    let admin = token_for(&state, 1, "m1");

    let (_, c) = send(
        &app,
        &admin,
        "POST",
        "/candidates",
        Some(json!({"room_id": room_id, "user_id": 4})),
    )
    .await;
    let c_id = c["id"].as_i64().unwrap();

    let (status, body) = send(&app, &admin, "POST", "/votes", Some(ballot_body(room_id, c_id, 5.5))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, &admin, "POST", "/votes", Some(ballot_body(room_id, c_id, 3.3))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_archive_flow_over_http() {
    let (app, state) = test_app().await;
    let room_id = setup_room(&app, &state, &[2, 4]).await;
    let admin = token_for(&state, 1, "m1");

    // One open vote and two access requests (one approved).
    let (_, c) = send(
        &app,
        &admin,
        "POST",
        "/candidates",
        Some(json!({"room_id": room_id, "user_id": 4})),
    )
    .await;
    let c_id = c["id"].as_i64().unwrap();

    let outsider = token_for(&state, 10, "outsider");
    let (status, _) = send(&app, &outsider, "POST", &format!("/rooms/{room_id}/access-requests"), None).await;
    assert_eq!(status, StatusCode::OK);
    let other = token_for(&state, 11, "other");
    let (status, req) = send(&app, &other, "POST", &format!("/rooms/{room_id}/access-requests"), None).await;
    assert_eq!(status, StatusCode::OK);
    let req_id = req["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        &admin,
        "POST",
        &format!("/rooms/{room_id}/access-requests/{req_id}/approve"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Precheck reflects the pending/approved split and the open vote.
    let (status, check) = send(&app, &admin, "GET", &format!("/rooms/{room_id}/archive/check"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(check["can_archive"], true);
    assert_eq!(check["effects"]["pending_will_be_rejected"].as_i64(), Some(1));
    assert_eq!(check["effects"]["approved_will_be_revoked"].as_i64(), Some(1));
    assert_eq!(check["effects"]["votes_will_be_closed"].as_i64(), Some(1));

    // A plain member cannot archive.
    let member = token_for(&state, 2, "m2");
    let (status, _) = send(
        &app,
        &member,
        "POST",
        &format!("/rooms/{room_id}/archive/confirm"),
        Some(json!({"reason": "A sufficiently long reason"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A short reason is rejected.
    let (status, _) = send(
        &app,
        &admin,
        "POST",
        &format!("/rooms/{room_id}/archive/confirm"),
        Some(json!({"reason": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        &admin,
        "POST",
        &format!("/rooms/{room_id}/archive/confirm"),
        Some(json!({"reason": "Registration deadline has passed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["pending_requests_rejected"].as_i64(), Some(1));
    assert_eq!(body["approved_requests_revoked"].as_i64(), Some(1));
    assert_eq!(body["room_name"], "Substance room");

    // Archived room rejects ballots, deterministically.
    let (status, body) = send(&app, &member, "POST", "/votes", Some(ballot_body(room_id, c_id, 4.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Re-archival is a conflict.
    let (status, _) = send(
        &app,
        &admin,
        "POST",
        &format!("/rooms/{room_id}/archive/confirm"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Admin unarchives; the vote reopens.
    let (status, body) = send(&app, &admin, "POST", &format!("/rooms/{room_id}/unarchive"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["unarchived_at"].as_i64().is_some());

    let (status, _) = send(&app, &member, "POST", "/votes", Some(ballot_body(room_id, c_id, 4.0))).await;
    assert_eq!(status, StatusCode::OK);
}
