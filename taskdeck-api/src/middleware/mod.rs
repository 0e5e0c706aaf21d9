/// Middleware for the web server
///
/// The session check lives next to the router in [`crate::app`].

pub mod security;
