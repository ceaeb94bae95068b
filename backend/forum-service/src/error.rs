/// Error types for forum-service
///
/// The persistence boundary raises typed failures (`RepoError`); the service
/// layer collapses every one of them into `ServiceError::Internal` before it
/// reaches a caller. The cause is logged, never returned.
use thiserror::Error;

/// Failures reported by a `ForumRepository` implementation.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => RepoError::Constraint(db_err.to_string()),
                _ => RepoError::Database(db_err.to_string()),
            },
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => RepoError::Unavailable(err.to_string()),
            sqlx::Error::Migrate(e) => RepoError::Schema(e.to_string()),
            sqlx::Error::ColumnNotFound(_) | sqlx::Error::TypeNotFound { .. } => {
                RepoError::Schema(err.to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for RepoError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        RepoError::Schema(err.to_string())
    }
}

/// Result type alias for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors surfaced to forum-service callers.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Any persistence failure. Carries no detail.
    #[error("internal service error")]
    Internal,

    /// Request parameters that cannot be turned into a query.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServiceError {
    /// Collapse a storage failure into the single outward-facing kind.
    ///
    /// Not-found, constraint, availability and schema failures all end up
    /// here; only the log line keeps them apart.
    pub fn from_store(operation: &'static str, err: RepoError) -> Self {
        tracing::error!(operation, error = %err, "Failed to access database");
        ServiceError::Internal
    }
}

/// Convert ServiceError to tonic::Status for gRPC responses
impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Internal => tonic::Status::internal(err.to_string()),
            ServiceError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
