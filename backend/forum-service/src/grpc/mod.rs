//! gRPC surface of forum-service

pub mod server;

pub use server::*;
