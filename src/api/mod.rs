//! Ops server API: HTTP pipeline, wire models, and resource accessors.

pub mod client;
pub mod models;
pub mod resources;
