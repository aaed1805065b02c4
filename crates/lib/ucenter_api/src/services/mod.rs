//! Business services called by handlers.

pub mod auth;
pub mod headers;
pub mod user;
