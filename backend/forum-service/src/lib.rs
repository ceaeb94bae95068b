/// Forum Service Library
///
/// Stores forum threads and their messages and serves them over gRPC with
/// offset pagination and wildcard filtering.
///
/// # Modules
///
/// - `services`: ContentService, filter normalization and pagination
/// - `repository`: persistence boundary and its PostgreSQL implementation
/// - `grpc`: Forum gRPC server and response conversion
/// - `models`: Thread and Message entities
/// - `error`: store and service error types
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod error;
pub mod grpc;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{RepoError, ServiceError, ServiceResult};
