// ABOUTME: Library root for warship - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod artifact;
pub mod config;
pub mod credentials;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod hooks;
pub mod http;
pub mod output;
pub mod rollout;
pub mod ssh;
pub mod types;
