pub mod password_reset;
pub mod session;
pub mod tally;
pub mod user;

pub use password_reset::PostgresPasswordResetRepository;
pub use session::PostgresSessionRepository;
pub use tally::PostgresErrorTallyRepository;
pub use user::PostgresUserRepository;
