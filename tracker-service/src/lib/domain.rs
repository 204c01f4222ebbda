pub mod session;
pub mod tally;
pub mod user;
