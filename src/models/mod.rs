pub mod attack;
pub mod log_entry;

pub use attack::{Attack, Severity};
pub use log_entry::LogEntry;
