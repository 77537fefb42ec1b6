/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `tasks`: Task CRUD and completion endpoints
pub mod auth;
pub mod health;
pub mod tasks;
