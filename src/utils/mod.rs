//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `lumen` application.
//!
//! This module centralizes the crate's error types and the tracing setup,
//! to promote code consistency and reduce duplication.

pub mod error;
pub mod logging;
