pub mod log_source;
pub mod parser;

pub use log_source::{LoadedLog, LogSource, ParseStats, SourceError};
pub use parser::{parse_line, parse_timestamp};
