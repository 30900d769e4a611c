//! Unit parsing utilities used by command-line flags and configuration

mod size;

pub use size::{SizeParseError, SizeUnit, parse_bytes};
