use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::session::models::SessionId;
use crate::tally::errors::ErrorCountError;
use crate::tally::errors::ErrorTallyIdError;
use crate::tally::errors::ErrorTypeError;

/// Count of one kind of unforced error within a session.
#[derive(Debug, Clone)]
pub struct ErrorTally {
    pub id: ErrorTallyId,
    pub session_id: SessionId,
    pub error_type: ErrorType,
    pub count: ErrorCount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorTallyId(pub Uuid);

impl ErrorTallyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, ErrorTallyIdError> {
        Uuid::parse_str(s)
            .map(ErrorTallyId)
            .map_err(|e| ErrorTallyIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for ErrorTallyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorTallyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-form error category such as "forehand net" (trimmed, 1-50 characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorType(String);

impl ErrorType {
    const MAX_LENGTH: usize = 50;

    pub fn new(error_type: String) -> Result<Self, ErrorTypeError> {
        let error_type = error_type.trim().to_string();
        let length = error_type.chars().count();

        if length == 0 {
            Err(ErrorTypeError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(ErrorTypeError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(error_type))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Number of occurrences, 0 to 10000 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCount(i32);

impl ErrorCount {
    const MIN: i32 = 0;
    const MAX: i32 = 10_000;

    pub fn new(count: i64) -> Result<Self, ErrorCountError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&count) {
            Ok(Self(count as i32))
        } else {
            Err(ErrorCountError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
                actual: count,
            })
        }
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl Default for ErrorCount {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Debug)]
pub struct CreateErrorTallyCommand {
    pub error_type: ErrorType,
    pub count: ErrorCount,
}

/// Only provided fields will be updated.
#[derive(Debug, Default)]
pub struct UpdateErrorTallyCommand {
    pub error_type: Option<ErrorType>,
    pub count: Option<ErrorCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_bounds() {
        assert_eq!(
            ErrorType::new(" double fault ".to_string()).unwrap().as_str(),
            "double fault"
        );
        assert_eq!(ErrorType::new("  ".to_string()), Err(ErrorTypeError::Empty));
        assert!(ErrorType::new("e".repeat(50)).is_ok());
        assert!(matches!(
            ErrorType::new("e".repeat(51)),
            Err(ErrorTypeError::TooLong { max: 50, actual: 51 })
        ));
    }

    #[test]
    fn test_error_count_bounds() {
        assert_eq!(ErrorCount::default().value(), 1);
        assert_eq!(ErrorCount::new(0).unwrap().value(), 0);
        assert_eq!(ErrorCount::new(10_000).unwrap().value(), 10_000);
        assert!(ErrorCount::new(-1).is_err());
        assert!(ErrorCount::new(10_001).is_err());
        assert!(ErrorCount::new(i64::MAX).is_err());
    }
}
