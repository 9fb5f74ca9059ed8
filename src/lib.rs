//! Bookswap application library
//!
//! Entity modules (users, books, swap requests, feedback) and the bootstrap that wires them to
//! storage and the HTTP server.

pub mod app;
pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
