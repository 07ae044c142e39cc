//! Document-level API over the storage layer.
//!
//! This module provides the [`ContentStore`] handle the rest of an
//! application talks to, and the configuration used to open it.

mod config;
mod store;

pub use config::{ConfigError, ConfigResult, StoreConfig, User, WikiConfig};
pub use store::{ContentStore, SaveOutcome, WikiError, WikiResult};
