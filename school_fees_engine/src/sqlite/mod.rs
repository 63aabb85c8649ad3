//! SQLite database module for the school fees engine.

mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
