pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod session;
pub mod stats;
