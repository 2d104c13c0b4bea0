//! Common test utilities for dataviz.
//!
//! This module provides shared fixtures and assertions for the integration tests.

// Re-export all common test utilities
pub mod assertions;
pub mod image_utils;
pub mod test_data;
