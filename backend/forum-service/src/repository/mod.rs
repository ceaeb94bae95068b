//! Persistence boundary for threads and messages.
//!
//! `ContentService` only talks to the store through [`ForumRepository`], so
//! the query contract (scoping, pattern predicate, paging, ordering) is
//! decided by the service and executed verbatim by the implementation.

pub mod postgres;

pub use postgres::PgForumRepository;

use crate::error::RepoResult;
use crate::models::{Message, NewMessage, NewThread, Thread};
use async_trait::async_trait;

/// Restricts a listing to one parent and, optionally, a LIKE pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Container id for threads, thread id for messages.
    pub parent_id: i64,
    /// Already-normalized LIKE pattern; `None` means no text predicate.
    pub pattern: Option<String>,
}

/// Direction applied to `created_at`, with `id` as tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Store capabilities required by forum-service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Idempotent schema setup for both entity kinds.
    async fn ensure_schema(&self) -> RepoResult<()>;

    /// Insert a thread and its optional first message as one unit.
    async fn create_thread(&self, new_thread: NewThread) -> RepoResult<Thread>;

    /// Insert a message into a live thread.
    async fn create_message(&self, new_message: NewMessage) -> RepoResult<Message>;

    /// Fetch one live thread; missing rows are `RepoError::NotFound`.
    async fn find_thread(&self, id: i64) -> RepoResult<Thread>;

    async fn count_threads(&self, scope: &Scope) -> RepoResult<u64>;

    async fn find_threads(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Thread>>;

    async fn count_messages(&self, scope: &Scope) -> RepoResult<u64>;

    async fn find_messages(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Message>>;

    /// Soft delete; deleting an absent or already deleted id is not an error.
    async fn delete_thread(&self, id: i64) -> RepoResult<()>;

    /// Soft delete; deleting an absent or already deleted id is not an error.
    async fn delete_message(&self, id: i64) -> RepoResult<()>;
}
