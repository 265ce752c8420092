//! hearth: household-management maintenance jobs.
//!
//! The crate keeps shopping lists tidy by pruning old checked items and
//! notifying subscribers about every item it removes. It can run the pruning
//! once on demand or on a schedule.

pub mod config;
pub mod db;
pub mod events;
pub mod models;
pub mod observability;
pub mod retention;
pub mod services;
