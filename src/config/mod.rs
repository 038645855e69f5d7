//! Configuration module for Trawler
//!
//! This module holds the per-run [`Settings`] record, the builder that applies
//! named overrides to it, and the TOML loader used by the binary.
//!
//! # Example
//!
//! ```
//! use trawler::config::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new()
//!     .max_depth(2)
//!     .parallels(4)
//!     .blacklist(["admin"])
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.max_depth, 2);
//! assert!(settings.blacklist.contains(&"admin".to_string()));
//! ```

mod builder;
mod parser;
mod types;
mod validation;

// Re-export types
pub use builder::SettingsBuilder;
pub use types::{Config, FetcherConfig, Settings, DEFAULT_BLACKLIST};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_fetcher_config, validate_settings};
