//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `notimux` crate.
//!
//! This module centralizes reusable components, such as the crate's error
//! type and logging setup, to promote consistency and reduce duplication.

pub mod error;
pub mod logging;
