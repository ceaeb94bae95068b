/// Data models for forum-service
///
/// - Thread: a titled discussion owned by an opaque container
/// - Message: a text body posted into a thread
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Thread {
    pub id: i64,
    pub container_id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub thread_id: i64,
    pub user_id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a thread, optionally together with its first message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewThread {
    pub container_id: i64,
    pub user_id: i64,
    pub title: String,
    /// Written by `user_id` in the same transaction as the thread.
    pub first_message: Option<String>,
}

/// Insert payload for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub thread_id: i64,
    pub user_id: i64,
    pub text: String,
}

/// One page of a filtered listing plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Listing<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Map an opaque u64 reference onto a BIGINT column.
///
/// Two's-complement reinterpretation: every u64 round-trips through
/// `from_db_id` and equality is preserved.
#[inline]
pub fn to_db_id(id: u64) -> i64 {
    id as i64
}

/// Inverse of [`to_db_id`].
#[inline]
pub fn from_db_id(id: i64) -> u64 {
    id as u64
}
