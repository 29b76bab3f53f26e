//! HTTP API and operator commands for the Paradox showcase catalog.

pub mod commands;
pub mod server;

pub use server::{build_router, run_serve, ServeArgs};
