//! Database rows for persisted sessions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::session::GameSession;
use crate::store::{StoreError, schema};

/// Stored session row.
///
/// The full session is kept as JSON in `payload`; `status` is duplicated so
/// it can be filtered on without decoding.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::game_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionRow {
    id: String,
    status: String,
    payload: String,
    updated_at: NaiveDateTime,
}

impl SessionRow {
    /// Decodes the session held in this row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the payload is not a valid session.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn into_session(self) -> Result<GameSession, StoreError> {
        debug!(status = %self.status, updated_at = %self.updated_at, "Decoding session row");
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// Insertable row for creating or replacing a session.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::game_sessions)]
pub struct NewSessionRow {
    id: String,
    status: String,
    payload: String,
    updated_at: NaiveDateTime,
}

impl NewSessionRow {
    /// Encodes `session` for storage, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session cannot be serialized.
    #[instrument(skip(session), fields(session_id = %session.id()))]
    pub fn from_session(session: &GameSession) -> Result<Self, StoreError> {
        Ok(Self {
            id: session.id().to_string(),
            status: session.status().to_string(),
            payload: serde_json::to_string(session)?,
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_four::Board;
    use uuid::Uuid;

    fn row_with_payload(payload: String) -> SessionRow {
        SessionRow {
            id: Uuid::new_v4().to_string(),
            status: "IN_PROGRESS".to_string(),
            payload,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_row_decodes_saved_session() {
        let session = GameSession::new(Uuid::new_v4(), Board::new(7, 6));
        let new_row = NewSessionRow::from_session(&session).unwrap();

        let decoded = row_with_payload(new_row.payload).into_session().unwrap();
        assert_eq!(decoded, session);
    }

    #[test]
    fn test_truncated_board_is_rejected() {
        let session = GameSession::new(Uuid::new_v4(), Board::new(7, 6));
        let mut json: serde_json::Value = serde_json::to_value(&session).unwrap();
        json["board"]["cells"] = serde_json::json!(["empty", "empty", "empty"]);

        let err = row_with_payload(json.to_string()).into_session().unwrap_err();
        assert!(err.message.contains("needs 42 cells"), "{}", err.message);
    }
}
