use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::tally::models::ErrorTally;
use crate::domain::user::models::UserId;
use crate::session::errors::SessionIdError;
use crate::session::errors::SessionNameError;

/// A practice or match session owned by one user.
///
/// `error_count` is derived: the sum of `count` over the session's tallies.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub name: SessionName,
    pub opponent_name: Option<OpponentName>,
    pub session_date: DateTime<Utc>,
    pub share_token: Option<ShareToken>,
    pub error_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}

/// Session unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a session ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, SessionIdError> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|e| SessionIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

const MAX_NAME_LENGTH: usize = 100;

fn validate_name(name: String) -> Result<String, SessionNameError> {
    let name = name.trim().to_string();
    let length = name.chars().count();

    if length == 0 {
        Err(SessionNameError::Empty)
    } else if length > MAX_NAME_LENGTH {
        Err(SessionNameError::TooLong {
            max: MAX_NAME_LENGTH,
            actual: length,
        })
    } else {
        Ok(name)
    }
}

/// Session title, trimmed, 1-100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionName(String);

impl SessionName {
    /// # Errors
    /// * `Empty` - Name is blank
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, SessionNameError> {
        validate_name(name).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opponent's name, same rules as [`SessionName`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentName(String);

impl OpponentName {
    pub fn new(name: String) -> Result<Self, SessionNameError> {
        validate_name(name).map(Self)
    }

    /// Blank input means "no opponent".
    pub fn optional(name: String) -> Result<Option<Self>, SessionNameError> {
        if name.trim().is_empty() {
            Ok(None)
        } else {
            Self::new(name).map(Some)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque token granting read-only public access to one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken(String);

impl ShareToken {
    pub fn generate() -> Self {
        Self(auth::url_safe_token())
    }

    pub fn from_stored(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to create a session for the authenticated owner
#[derive(Debug)]
pub struct CreateSessionCommand {
    pub name: SessionName,
    pub opponent_name: Option<OpponentName>,
    pub session_date: DateTime<Utc>,
}

/// Partial update of a session.
///
/// `opponent_name: Some(None)` clears the opponent.
#[derive(Debug, Default)]
pub struct UpdateSessionCommand {
    pub name: Option<SessionName>,
    pub opponent_name: Option<Option<OpponentName>>,
    pub session_date: Option<DateTime<Utc>>,
}

/// Public, read-only view of a shared session with its tallies.
#[derive(Debug, Clone)]
pub struct SharedSession {
    pub session: Session,
    pub errors: Vec<ErrorTally>,
}
