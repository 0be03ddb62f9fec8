//! vmgate-core: shared error taxonomy and configuration
//!
//! Every other vmgate crate depends on this one for its `Error` type and
//! for reading process configuration from the environment.

pub mod config;
pub mod error;

pub use config::GatewayConfig;
pub use error::{Error, Result};
