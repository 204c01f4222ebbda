//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the tracker service:
//! - Password hashing (Argon2id, tunable cost)
//! - Signed, time-bounded identity tokens (JWT, HS256 only)
//! - Random URL-safe tokens for share links and password resets
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Identity Tokens
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! let token = auth.issue_token("user123").unwrap();
//! let subject = auth.verify_token(&token).unwrap();
//! assert_eq!(subject, "user123");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod random;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use random::url_safe_token;
