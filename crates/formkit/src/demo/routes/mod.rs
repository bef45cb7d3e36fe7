//! HTTP route handlers for the demo server.

pub mod contact;
pub mod health;
