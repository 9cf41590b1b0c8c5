//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Arena handles for component storage
//! - Frame timing
//! - Logging bootstrap

pub mod collections;
pub mod logging;
pub mod math;
pub mod time;
