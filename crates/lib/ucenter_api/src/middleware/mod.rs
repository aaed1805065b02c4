//! Request middleware: authentication, authorization and access logging.

pub mod access_log;
pub mod auth;
pub mod role;
