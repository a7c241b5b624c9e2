//! Configuration utilities.
//!
//! - [`config`] - TOML-based application configuration (`hatchup.toml`)
//! - [`secrets`] - layered credential lookup (environment, then secrets file sections)

/// TOML application configuration.
pub mod config;
/// Layered secret lookup.
pub mod secrets;
