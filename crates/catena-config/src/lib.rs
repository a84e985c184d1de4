//! Catena Config
//!
//! This crate contains the serializable runtime settings for catena. They
//! are not part of a chain definition; they tune how built-in task types
//! behave (HTTP timeouts, user agent) and how the binary logs.
//!
//! Settings can be loaded from:
//! - a JSON file (via CLI with `--config=config.json`)
//! - `~/.catena/config.json` when no path is given
//!
//! Every field is optional; missing fields fall back to their defaults.
//!
//! ```json
//! {
//!   "http": { "connection_timeout_ms": 5000 },
//!   "log": { "filter": "catena=debug" }
//! }
//! ```

mod config;
mod error;
mod http;

pub use config::{CatenaConfig, LogConfig};
pub use error::ConfigError;
pub use http::HttpConfig;
