//! Resolution of the effective pipeline configuration.
//!
//! Sources, lowest precedence first: [`defaults::DefaultsConfig`], a TOML file
//! ([`file::FileConfig`]), `-S key=value` overrides, then command-line flags
//! and their environment variables.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::AppConfig;
