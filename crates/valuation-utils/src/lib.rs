//! Shared utilities for the valuation client workspace
//!
//! Logging setup and typed environment lookups used by both the client
//! library and the command-line front-end.

pub mod env;
pub mod logging;

pub use env::{EnvError, env_or, env_parse};
pub use logging::{init_tracing, init_tracing_with};
