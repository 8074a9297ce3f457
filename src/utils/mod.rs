//! Utility modules for common functionality.
//!
//! - logging: Logging setup for embedding applications
//! - tests: Builders for test instances of the models

pub mod logging;
