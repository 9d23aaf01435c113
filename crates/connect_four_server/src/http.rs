//! REST interface over the turn engine.

use crate::engine::TurnEngine;
use crate::error::{EngineError, ErrorKind};
use crate::session::{GameSession, SessionId};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Request body for making a move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Column to drop the disc into (0-based, left to right).
    pub column: i64,
}

/// Error body returned for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error category.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

/// Why a request was rejected.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    /// The path or body could not be decoded.
    #[display("Malformed request: {}", _0)]
    Malformed(String),

    /// The engine refused the operation.
    #[display("{}", _0)]
    Engine(EngineError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Malformed(_) => ErrorKind::InvalidArgument,
            ApiError::Engine(err) => err.kind(),
        }
    }
}

/// Builds the router serving `/games`.
pub fn router(engine: Arc<TurnEngine>) -> Router {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/moves", post(make_move))
        .with_state(engine)
}

#[instrument(skip(engine))]
async fn create_game(
    State(engine): State<Arc<TurnEngine>>,
) -> Result<(StatusCode, Json<GameSession>), ApiError> {
    let session = engine.create_session().await?;
    info!(session_id = %session.id(), "Game created over HTTP");
    Ok((StatusCode::CREATED, Json(session)))
}

#[instrument(skip(engine, id))]
async fn get_game(
    State(engine): State<Arc<TurnEngine>>,
    id: Result<Path<SessionId>, PathRejection>,
) -> Result<Json<GameSession>, ApiError> {
    let Path(id) = id?;
    Ok(Json(engine.get_session(id).await?))
}

#[instrument(skip(engine, id, req))]
async fn make_move(
    State(engine): State<Arc<TurnEngine>>,
    id: Result<Path<SessionId>, PathRejection>,
    req: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<GameSession>, ApiError> {
    let Path(id) = id?;
    let Json(req) = req?;
    let session = engine.perform_move(id, req.column).await?;
    info!(session_id = %id, column = req.column, status = %session.status(), "Move completed");
    Ok(Json(session))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = match kind {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::SessionNotFound => StatusCode::NOT_FOUND,
            ErrorKind::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(%kind, error = %self, "Request rejected");

        let body = ErrorBody {
            kind: kind.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
