//! In-memory ForumRepository for integration tests
//!
//! Mirrors the PostgreSQL implementation closely enough to exercise the
//! service contract without a database: soft deletes, LIKE matching,
//! created_at/id ordering, transactional thread creation. Every call is
//! counted and any operation can be made to fail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_service::error::{RepoError, RepoResult};
use forum_service::models::{Message, NewMessage, NewThread, Thread};
use forum_service::repository::{ForumRepository, Scope, SortOrder};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    threads: Vec<(Thread, bool)>,
    messages: Vec<(Message, bool)>,
    next_thread_id: i64,
    next_message_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn thread_is_live(&self, id: i64) -> bool {
        self.threads
            .iter()
            .any(|(thread, deleted)| thread.id == id && !deleted)
    }
}

#[derive(Default)]
pub struct MemoryForumRepository {
    state: Mutex<State>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `operation` was invoked.
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    /// Make `operation` fail with `RepoError::Unavailable` from now on.
    ///
    /// `"create_first_message"` fails the message half of a thread creation
    /// after the thread row was staged.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn stored_threads(&self) -> usize {
        self.state.lock().unwrap().threads.len()
    }

    pub fn stored_messages(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    fn enter(&self, operation: &'static str) -> RepoResult<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(operation) {
            return Err(RepoError::Unavailable(format!("{operation} is down")));
        }
        Ok(())
    }

    fn is_failing(&self, operation: &str) -> bool {
        self.failing.lock().unwrap().contains(operation)
    }
}

/// SQL LIKE: `%` matches any run, `_` any single character.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // matches[j] == pattern[..i] matches text[..j]
    let mut matches = vec![false; text.len() + 1];
    matches[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= matches[j];
                    next[j] = seen;
                }
            }
            '_' => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1];
                }
            }
            c => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1] && text[j - 1] == *c;
                }
            }
        }
        matches = next;
    }
    matches[text.len()]
}

fn in_scope(scope: &Scope, parent_id: i64, text: &str) -> bool {
    parent_id == scope.parent_id
        && scope
            .pattern
            .as_deref()
            .map_or(true, |pattern| like_matches(pattern, text))
}

fn paginate<T, K: Ord>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> K,
    offset: i64,
    limit: i64,
    order: SortOrder,
) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    if order == SortOrder::Descending {
        rows.reverse();
    }
    rows.into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

#[async_trait]
impl ForumRepository for MemoryForumRepository {
    async fn ensure_schema(&self) -> RepoResult<()> {
        self.enter("ensure_schema")
    }

    async fn create_thread(&self, new_thread: NewThread) -> RepoResult<Thread> {
        self.enter("create_thread")?;
        let mut state = self.state.lock().unwrap();

        // Stage both rows and publish them together, like a transaction.
        let created_at = state.now();
        let thread = Thread {
            id: state.next_thread_id + 1,
            container_id: new_thread.container_id,
            user_id: new_thread.user_id,
            title: new_thread.title,
            created_at,
        };

        let message = match new_thread.first_message {
            Some(text) => {
                if self.is_failing("create_first_message") {
                    return Err(RepoError::Unavailable("message insert failed".to_string()));
                }
                Some(Message {
                    id: state.next_message_id + 1,
                    thread_id: thread.id,
                    user_id: new_thread.user_id,
                    text,
                    created_at,
                })
            }
            None => None,
        };

        state.next_thread_id += 1;
        state.threads.push((thread.clone(), false));
        if let Some(message) = message {
            state.next_message_id += 1;
            state.messages.push((message, false));
        }
        Ok(thread)
    }

    async fn create_message(&self, new_message: NewMessage) -> RepoResult<Message> {
        self.enter("create_message")?;
        let mut state = self.state.lock().unwrap();

        if !state.thread_is_live(new_message.thread_id) {
            return Err(RepoError::NotFound);
        }

        let created_at = state.now();
        state.next_message_id += 1;
        let message = Message {
            id: state.next_message_id,
            thread_id: new_message.thread_id,
            user_id: new_message.user_id,
            text: new_message.text,
            created_at,
        };
        state.messages.push((message.clone(), false));
        Ok(message)
    }

    async fn find_thread(&self, id: i64) -> RepoResult<Thread> {
        self.enter("find_thread")?;
        let state = self.state.lock().unwrap();
        state
            .threads
            .iter()
            .find(|(thread, deleted)| thread.id == id && !deleted)
            .map(|(thread, _)| thread.clone())
            .ok_or(RepoError::NotFound)
    }

    async fn count_threads(&self, scope: &Scope) -> RepoResult<u64> {
        self.enter("count_threads")?;
        let state = self.state.lock().unwrap();
        let total = state
            .threads
            .iter()
            .filter(|(t, deleted)| !deleted && in_scope(scope, t.container_id, &t.title))
            .count();
        Ok(total as u64)
    }

    async fn find_threads(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Thread>> {
        self.enter("find_threads")?;
        let state = self.state.lock().unwrap();
        let rows: Vec<Thread> = state
            .threads
            .iter()
            .filter(|(t, deleted)| !deleted && in_scope(scope, t.container_id, &t.title))
            .map(|(t, _)| t.clone())
            .collect();
        Ok(paginate(rows, |t| (t.created_at, t.id), offset, limit, order))
    }

    async fn count_messages(&self, scope: &Scope) -> RepoResult<u64> {
        self.enter("count_messages")?;
        let state = self.state.lock().unwrap();
        let total = state
            .messages
            .iter()
            .filter(|(m, deleted)| !deleted && in_scope(scope, m.thread_id, &m.text))
            .count();
        Ok(total as u64)
    }

    async fn find_messages(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Message>> {
        self.enter("find_messages")?;
        let state = self.state.lock().unwrap();
        let rows: Vec<Message> = state
            .messages
            .iter()
            .filter(|(m, deleted)| !deleted && in_scope(scope, m.thread_id, &m.text))
            .map(|(m, _)| m.clone())
            .collect();
        Ok(paginate(rows, |m| (m.created_at, m.id), offset, limit, order))
    }

    async fn delete_thread(&self, id: i64) -> RepoResult<()> {
        self.enter("delete_thread")?;
        let mut state = self.state.lock().unwrap();
        for (thread, deleted) in state.threads.iter_mut() {
            if thread.id == id {
                *deleted = true;
            }
        }
        Ok(())
    }

    async fn delete_message(&self, id: i64) -> RepoResult<()> {
        self.enter("delete_message")?;
        let mut state = self.state.lock().unwrap();
        for (message, deleted) in state.messages.iter_mut() {
            if message.id == id {
                *deleted = true;
            }
        }
        Ok(())
    }
}
