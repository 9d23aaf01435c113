//! Tests for the REST routes.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header};
use connect_four::{LeftmostOpponent, Move, Player};
use connect_four_server::http::{self, ErrorBody};
use connect_four_server::{EngineSettings, GameSession, MemoryStore, SessionStatus, TurnEngine};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let engine = TurnEngine::new(
        EngineSettings::default(),
        Arc::new(MemoryStore::new()),
        Arc::new(LeftmostOpponent),
    );
    http::router(Arc::new(engine))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> T {
    serde_json::from_slice(body).expect("Body was not the expected JSON")
}

fn create_request() -> Request<Body> {
    Request::post("/games").body(Body::empty()).unwrap()
}

fn move_request(id: &str, body: &str) -> Request<Body> {
    Request::post(format!("/games/{}/moves", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create_game(app: &Router) -> GameSession {
    let (status, body) = send(app, create_request()).await;
    assert_eq!(status, StatusCode::CREATED);
    decode(&body)
}

#[tokio::test]
async fn test_create_game_returns_fresh_session() {
    let app = app();
    let session = create_game(&app).await;

    assert_eq!(*session.status(), SessionStatus::InProgress);
    assert_eq!(session.board().disc_count(), 0);
    assert_eq!(*session.first_player_last_move(), None);
}

#[tokio::test]
async fn test_move_then_get() {
    let app = app();
    let id = create_game(&app).await.id().to_string();

    let (status, body) = send(&app, move_request(&id, r#"{"column":4}"#)).await;
    assert_eq!(status, StatusCode::OK);
    let played: GameSession = decode(&body);
    assert_eq!(played.last_move(Player::First), Some(Move::new(4, 0)));
    assert_eq!(played.last_move(Player::Second), Some(Move::new(0, 0)));

    let request = Request::get(format!("/games/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decode::<GameSession>(&body), played);
}

#[tokio::test]
async fn test_session_json_shape() {
    let app = app();
    let id = create_game(&app).await.id().to_string();

    let (_, body) = send(&app, move_request(&id, r#"{"column":2}"#)).await;
    let json: serde_json::Value = decode(&body);

    assert_eq!(json["id"], id.as_str());
    assert_eq!(json["status"], "IN_PROGRESS");
    assert_eq!(json["first_player_last_move"]["column"], 2);
    assert_eq!(json["second_player_last_move"]["column"], 0);
}

#[tokio::test]
async fn test_out_of_range_column_is_bad_request() {
    let app = app();
    let id = create_game(&app).await.id().to_string();

    for column in ["-1", "7"] {
        let body = format!(r#"{{"column":{}}}"#, column);
        let (status, body) = send(&app, move_request(&id, &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = decode(&body);
        assert_eq!(error.kind, "invalid_argument");
    }
}

#[tokio::test]
async fn test_unknown_game_is_not_found() {
    let app = app();
    let id = uuid::Uuid::new_v4().to_string();

    let (status, body) = send(&app, move_request(&id, r#"{"column":0}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(decode::<ErrorBody>(&body).kind, "session_not_found");

    let request = Request::get(format!("/games/{}", id))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_finished_game_rejects_moves() {
    let app = app();
    let id = create_game(&app).await.id().to_string();

    for _ in 0..3 {
        let (status, _) = send(&app, move_request(&id, r#"{"column":6}"#)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, move_request(&id, r#"{"column":6}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        *decode::<GameSession>(&body).status(),
        SessionStatus::FirstPlayerWon
    );

    let (status, _) = send(&app, move_request(&id, r#"{"column":3}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_requests_are_rejected() {
    let app = app();
    let id = create_game(&app).await.id().to_string();

    for body in [r#"{"col":1}"#, r#"{"column":1.5}"#, "not json"] {
        let (status, body) = send(&app, move_request(&id, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(decode::<ErrorBody>(&body).kind, "invalid_argument");
    }

    let (status, body) = send(&app, move_request("not-a-uuid", r#"{"column":1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = decode(&body);
    assert_eq!(error.kind, "invalid_argument");
    assert!(error.message.starts_with("Malformed request"));

    let request = Request::get("/games/not-a-uuid").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(decode::<ErrorBody>(&body).kind, "invalid_argument");

    // Nothing was played by the rejected requests.
    let request = Request::get(format!("/games/{}", id)).body(Body::empty()).unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(decode::<GameSession>(&body).board().disc_count(), 0);
}
