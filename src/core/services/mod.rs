pub mod auth_service;
pub mod namespace_service;
pub mod run_service;
pub mod types;
