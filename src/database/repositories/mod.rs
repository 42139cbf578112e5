pub mod business;
pub mod employee;
pub mod payment;
pub mod time_log;

// Re-export all repositories for easy importing
pub use business::BusinessRepository;
pub use employee::EmployeeRepository;
pub use payment::PaymentRepository;
pub use time_log::{NewTimeLog, TimeLogRepository};
