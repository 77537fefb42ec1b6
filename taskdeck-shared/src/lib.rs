//! # TaskDeck Shared Library
//!
//! This crate contains the types and business logic shared by the
//! TaskDeck API server and its tests.
//!
//! ## Module Organization
//!
//! - `models`: Database models (tasks, users) and their CRUD operations
//! - `auth`: Password hashing, JWT tokens, request auth context
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the TaskDeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
