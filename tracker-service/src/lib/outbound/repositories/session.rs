use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::models::OpponentName;
use crate::domain::session::models::Session;
use crate::domain::session::models::SessionId;
use crate::domain::session::models::SessionName;
use crate::domain::session::models::ShareToken;
use crate::domain::session::ports::SessionRepository;
use crate::domain::user::models::UserId;
use crate::session::errors::SessionError;

// error_count is always derived from the tallies, never stored.
const SELECT_SESSIONS: &str = r#"
    SELECT s.id, s.user_id, s.name, s.opponent_name, s.session_date, s.share_token,
           s.created_at, s.updated_at,
           COALESCE(SUM(e.count), 0)::BIGINT AS error_count
    FROM sessions s
    LEFT JOIN session_errors e ON e.session_id = s.id
"#;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    opponent_name: Option<String>,
    session_date: DateTime<Utc>,
    share_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    error_count: i64,
}

impl TryFrom<SessionRow> for Session {
    type Error = SessionError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let opponent_name = row
            .opponent_name
            .map(OpponentName::optional)
            .transpose()
            .map_err(SessionError::InvalidOpponentName)?
            .flatten();

        Ok(Session {
            id: SessionId(row.id),
            user_id: UserId(row.user_id),
            name: SessionName::new(row.name)?,
            opponent_name,
            session_date: row.session_date,
            share_token: row.share_token.map(ShareToken::from_stored),
            error_count: row.error_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_one(condition: &str) -> String {
    format!("{} WHERE {} GROUP BY s.id", SELECT_SESSIONS, condition)
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, SessionError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, name, opponent_name, session_date, share_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.id.0)
        .bind(session.user_id.0)
        .bind(session.name.as_str())
        .bind(session.opponent_name.as_ref().map(|o| o.as_str().to_string()))
        .bind(session.session_date)
        .bind(session.share_token.as_ref().map(|t| t.as_str().to_string()))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        Ok(session)
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(&select_one("s.id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.map(Session::try_from).transpose()
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Session>, SessionError> {
        let query = format!(
            "{} WHERE s.user_id = $1 GROUP BY s.id ORDER BY s.session_date DESC",
            SELECT_SESSIONS
        );

        let rows: Vec<SessionRow> = sqlx::query_as(&query)
            .bind(owner.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Session::try_from).collect()
    }

    async fn update(&self, session: Session) -> Result<Session, SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET name = $2, opponent_name = $3, session_date = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(session.id.0)
        .bind(session.name.as_str())
        .bind(session.opponent_name.as_ref().map(|o| o.as_str().to_string()))
        .bind(session.session_date)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound(session.id.to_string()));
        }

        Ok(session)
    }

    async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn set_share_token(
        &self,
        id: &SessionId,
        token: Option<ShareToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET share_token = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(token.map(|t| t.as_str().to_string()))
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn find_by_share_token(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let row: Option<SessionRow> = sqlx::query_as(&select_one("s.share_token = $1"))
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

        row.map(Session::try_from).transpose()
    }
}
