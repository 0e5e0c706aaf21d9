//! # Taskdeck Web Server Library
//!
//! Router, handlers and HTML views for the Taskdeck task manager.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session middleware
//! - `config`: Configuration management
//! - `cookies`: Session and flash cookies
//! - `error`: Error handling and response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers
//! - `views`: Server-rendered HTML

pub mod app;
pub mod config;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod views;
