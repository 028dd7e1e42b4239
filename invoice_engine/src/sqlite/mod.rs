//! SQLite backend for the invoice engine.
//!
//! The schema lives in `migrations/` and is embedded in the binary. [`SqliteDatabase::migrate`] applies it
//! idempotently, so it is safe to call on every start-up.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
