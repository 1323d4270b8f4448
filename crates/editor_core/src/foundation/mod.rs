//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the editor core:
//! - Math types and transform composition
//! - Logging utilities

pub mod logging;
pub mod math;
