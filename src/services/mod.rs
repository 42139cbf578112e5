pub mod hours;
pub mod import;
pub mod notification;
pub mod payroll;
pub mod settlement;
pub mod time_entry;

#[cfg(test)]
mod payroll_tests;

pub use import::ImportService;
pub use notification::{LogOnlySender, NotificationSender};
pub use payroll::PayrollService;
pub use settlement::SettlementService;
pub use time_entry::TimeEntryService;
