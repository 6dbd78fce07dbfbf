//! Unit tests for individual components

mod builders_test;
mod config_test;
mod context_test;
mod error_test;
