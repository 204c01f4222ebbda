use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::models::SessionId;
use crate::domain::tally::models::ErrorCount;
use crate::domain::tally::models::ErrorTally;
use crate::domain::tally::models::ErrorTallyId;
use crate::domain::tally::models::ErrorType;
use crate::domain::tally::ports::ErrorTallyRepository;
use crate::tally::errors::ErrorTallyError;

#[derive(sqlx::FromRow)]
struct ErrorTallyRow {
    id: Uuid,
    session_id: Uuid,
    error_type: String,
    count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ErrorTallyRow> for ErrorTally {
    type Error = ErrorTallyError;

    fn try_from(row: ErrorTallyRow) -> Result<Self, Self::Error> {
        Ok(ErrorTally {
            id: ErrorTallyId(row.id),
            session_id: SessionId(row.session_id),
            error_type: ErrorType::new(row.error_type)?,
            count: ErrorCount::new(row.count.into())?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PostgresErrorTallyRepository {
    pool: PgPool,
}

impl PostgresErrorTallyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorTallyRepository for PostgresErrorTallyRepository {
    async fn create(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError> {
        sqlx::query(
            r#"
            INSERT INTO session_errors (id, session_id, error_type, count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tally.id.0)
        .bind(tally.session_id.0)
        .bind(tally.error_type.as_str())
        .bind(tally.count.value())
        .bind(tally.created_at)
        .bind(tally.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The session can vanish between the ownership check and the insert
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_foreign_key_violation() {
                    return ErrorTallyError::SessionNotFound(tally.session_id.to_string());
                }
            }
            ErrorTallyError::DatabaseError(e.to_string())
        })?;

        Ok(tally)
    }

    async fn find_by_id(&self, id: &ErrorTallyId) -> Result<Option<ErrorTally>, ErrorTallyError> {
        let row: Option<ErrorTallyRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, error_type, count, created_at, updated_at
            FROM session_errors
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ErrorTallyError::DatabaseError(e.to_string()))?;

        row.map(ErrorTally::try_from).transpose()
    }

    async fn list_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<ErrorTally>, ErrorTallyError> {
        let rows: Vec<ErrorTallyRow> = sqlx::query_as(
            r#"
            SELECT id, session_id, error_type, count, created_at, updated_at
            FROM session_errors
            WHERE session_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(session_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ErrorTallyError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(ErrorTally::try_from).collect()
    }

    async fn update(&self, tally: ErrorTally) -> Result<ErrorTally, ErrorTallyError> {
        let result = sqlx::query(
            r#"
            UPDATE session_errors
            SET error_type = $2, count = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(tally.id.0)
        .bind(tally.error_type.as_str())
        .bind(tally.count.value())
        .bind(tally.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ErrorTallyError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ErrorTallyError::NotFound(tally.id.to_string()));
        }

        Ok(tally)
    }

    async fn delete(&self, id: &ErrorTallyId) -> Result<(), ErrorTallyError> {
        let result = sqlx::query("DELETE FROM session_errors WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| ErrorTallyError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ErrorTallyError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
