//! Storage layer for opsdash
//!
//! Handles configuration management and session-token persistence.
//! Uses the OS keyring for the bearer token and TOML for configuration files.

pub mod config;
pub mod credentials;

use crate::error::StorageError;

type Result<T> = std::result::Result<T, StorageError>;
