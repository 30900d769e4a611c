//! testsieve - Rule-based test selection
//!
//! This library decides, per test, whether it should run. Tests are
//! identified by class and method name and checked against an ordered list
//! of include/exclude selectors; the first matching selector decides and a
//! configurable default covers tests no selector matches.

pub mod cli;
pub mod config;
pub mod error;
pub mod selectors;
pub mod telemetry;
pub mod units;
