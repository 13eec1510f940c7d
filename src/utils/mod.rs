//! Utils module - Shared utilities and helpers
//!
//! This module provides utility functions and helpers that are used across
//! multiple layers of the application architecture.

/// Input validation and sanitization utilities
pub mod validation;

/// Declared-variable flattening for run payloads
pub mod variables;

/// Binary-suffix quantity formatting
pub mod units;
