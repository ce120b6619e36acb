//! SQLite backend for the DevMarket engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
