//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Descriptor codec tests
//! - Shortcut table registration and collision tests

#[cfg(test)]
mod table_tests;
