//! CLI module - Command-line interface
//!
//! Parses the command line and routes each command to the core services,
//! rendering results through the display layer.

pub mod dispatcher;
pub mod main_types;
pub mod views;
