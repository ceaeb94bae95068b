/// Content service - request parameters to store queries and back
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Listing, Message, NewMessage, NewThread, Thread};
use crate::repository::{ForumRepository, Scope, SortOrder};
use crate::services::filter::build_like_pattern;
use crate::services::pagination::Page;
use std::sync::Arc;

/// Threads are browsed newest first.
const THREAD_ORDER: SortOrder = SortOrder::Descending;
/// Messages inside a thread read chronologically.
const MESSAGE_ORDER: SortOrder = SortOrder::Ascending;

#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn ForumRepository>,
}

impl ContentService {
    /// Prepare the schema, then hand out a service bound to `repo`.
    pub async fn initialize(repo: Arc<dyn ForumRepository>) -> ServiceResult<Self> {
        repo.ensure_schema()
            .await
            .map_err(|e| ServiceError::from_store("ensure_schema", e))?;
        Ok(Self { repo })
    }

    /// Create a thread; a non-empty `text` becomes its first message in the
    /// same transaction.
    pub async fn create_thread(
        &self,
        container_id: i64,
        user_id: i64,
        title: String,
        text: String,
    ) -> ServiceResult<i64> {
        let first_message = if text.is_empty() { None } else { Some(text) };
        let new_thread = NewThread {
            container_id,
            user_id,
            title,
            first_message,
        };

        let thread = self
            .repo
            .create_thread(new_thread)
            .await
            .map_err(|e| ServiceError::from_store("create_thread", e))?;

        tracing::debug!(thread_id = thread.id, container_id, "Thread created");
        Ok(thread.id)
    }

    pub async fn create_message(
        &self,
        thread_id: i64,
        user_id: i64,
        text: String,
    ) -> ServiceResult<i64> {
        let message = self
            .repo
            .create_message(NewMessage {
                thread_id,
                user_id,
                text,
            })
            .await
            .map_err(|e| ServiceError::from_store("create_message", e))?;

        tracing::debug!(message_id = message.id, thread_id, "Message created");
        Ok(message.id)
    }

    pub async fn get_thread(&self, id: i64) -> ServiceResult<Thread> {
        self.repo
            .find_thread(id)
            .await
            .map_err(|e| ServiceError::from_store("get_thread", e))
    }

    /// Page of a container's threads matching `filter` on the title, newest
    /// first. `total` counts the whole filtered set.
    pub async fn get_threads(
        &self,
        container_id: i64,
        filter: &str,
        start: u64,
        end: u64,
    ) -> ServiceResult<Listing<Thread>> {
        let page = Page::new(start, end)?;
        let scope = Scope {
            parent_id: container_id,
            pattern: build_like_pattern(filter),
        };

        let total = self
            .repo
            .count_threads(&scope)
            .await
            .map_err(|e| ServiceError::from_store("count_threads", e))?;
        if total == 0 {
            return Ok(Listing::empty());
        }

        let items = self
            .repo
            .find_threads(&scope, page.offset(), page.limit(), THREAD_ORDER)
            .await
            .map_err(|e| ServiceError::from_store("find_threads", e))?;

        Ok(Listing { items, total })
    }

    /// Page of a thread's messages matching `filter` on the text, oldest
    /// first. `total` counts the whole filtered set.
    pub async fn get_messages(
        &self,
        thread_id: i64,
        filter: &str,
        start: u64,
        end: u64,
    ) -> ServiceResult<Listing<Message>> {
        let page = Page::new(start, end)?;
        let scope = Scope {
            parent_id: thread_id,
            pattern: build_like_pattern(filter),
        };

        let total = self
            .repo
            .count_messages(&scope)
            .await
            .map_err(|e| ServiceError::from_store("count_messages", e))?;
        if total == 0 {
            return Ok(Listing::empty());
        }

        let items = self
            .repo
            .find_messages(&scope, page.offset(), page.limit(), MESSAGE_ORDER)
            .await
            .map_err(|e| ServiceError::from_store("find_messages", e))?;

        Ok(Listing { items, total })
    }

    /// Messages of the thread are left in place.
    pub async fn delete_thread(&self, id: i64) -> ServiceResult<()> {
        self.repo
            .delete_thread(id)
            .await
            .map_err(|e| ServiceError::from_store("delete_thread", e))
    }

    pub async fn delete_message(&self, id: i64) -> ServiceResult<()> {
        self.repo
            .delete_message(id)
            .await
            .map_err(|e| ServiceError::from_store("delete_message", e))
    }
}
