//! oktarecon CLI library
//!
//! The binary in main.rs is a thin clap front end over these modules,
//! which are public so integration tests can drive them directly.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
