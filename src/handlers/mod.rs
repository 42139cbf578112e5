pub mod business;
pub mod employees;
pub mod import;
pub mod payments;
pub mod payroll;
pub mod shared;
pub mod time_logs;
