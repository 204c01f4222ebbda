pub mod log;

pub use log::LoggingResetNotifier;
