pub mod business;
pub mod employee;
pub(crate) mod macros;
pub mod payment;
pub mod pending;
pub mod time_log;

// Re-export all models for easy importing
pub use business::*;
pub use employee::*;
pub use payment::*;
pub use pending::*;
pub use time_log::*;
