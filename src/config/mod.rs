//! Configuration module for ParaXm
//!
//! This module handles scan settings: TOML loading, validation, and the
//! built-in User-Agent pool.
//!
//! # Example
//!
//! ```no_run
//! use paraxm::config::{load_config, validate};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("scan.toml")).unwrap();
//! config.target = "https://example.com".to_string();
//! validate(&config).unwrap();
//! ```

mod parser;
mod types;
mod user_agents;
mod validation;

// Re-export types
pub use types::ScanConfig;

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, parse_config};
pub use user_agents::{default_user_agents, random_user_agent, FALLBACK_USER_AGENT};
pub use validation::{validate, validation_errors};
