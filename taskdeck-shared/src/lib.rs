//! # Taskdeck Shared Library
//!
//! This crate contains the data layer and authentication primitives used by
//! the Taskdeck web server.
//!
//! ## Module Organization
//!
//! - `db`: SQLite pool management and the versioned schema upgrader
//! - `models`: Accounts, tasks and sessions with their store operations
//! - `auth`: Password hashing, session tokens, credential checks
//! - `flash`: One-shot user-facing messages

pub mod auth;
pub mod db;
pub mod flash;
pub mod models;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
