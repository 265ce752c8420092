//! Shared database repository test infrastructure
//!
//! Repository tests run against fast in-memory SQLite databases with the real
//! migrations applied.
//!
//! # Architecture
//!
//! Each repository has a test module (e.g., `groups.rs`) containing:
//! - Shared test functions that take a context of `&dyn XxxRepo`
//! - A `sqlite_tests` module that builds the context from a [`DbSession`]
//!   and registers each shared function as a `#[tokio::test]`
//!
//! [`DbSession`]: crate::db::DbSession

mod shopping_lists;
