use super::{ForumRepository, Scope, SortOrder};
use crate::error::{RepoError, RepoResult};
use crate::models::{Message, NewMessage, NewThread, Thread};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres};

/// Table layout shared by the count and page queries of one entity kind.
struct TableSpec {
    name: &'static str,
    columns: &'static str,
    parent_column: &'static str,
    text_column: &'static str,
}

const THREADS: TableSpec = TableSpec {
    name: "threads",
    columns: "id, container_id, user_id, title, created_at",
    parent_column: "container_id",
    text_column: "title",
};

const MESSAGES: TableSpec = TableSpec {
    name: "messages",
    columns: "id, thread_id, user_id, text, created_at",
    parent_column: "thread_id",
    text_column: "text",
};

impl TableSpec {
    fn where_clause(&self, with_pattern: bool) -> String {
        let mut clause = format!("{} = $1 AND deleted_at IS NULL", self.parent_column);
        if with_pattern {
            clause.push_str(&format!(" AND {} LIKE $2", self.text_column));
        }
        clause
    }

    fn count_sql(&self, with_pattern: bool) -> String {
        format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.name,
            self.where_clause(with_pattern)
        )
    }

    fn page_sql(&self, with_pattern: bool, order: SortOrder) -> String {
        let (limit_arg, offset_arg) = if with_pattern { (3, 4) } else { (2, 3) };
        let direction = order.as_sql();
        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at {direction}, id {direction} LIMIT ${limit_arg} OFFSET ${offset_arg}",
            self.columns,
            self.name,
            self.where_clause(with_pattern),
        )
    }

    fn soft_delete_sql(&self) -> String {
        format!(
            "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
            self.name
        )
    }
}

/// PostgreSQL-backed forum store
#[derive(Clone)]
pub struct PgForumRepository {
    pool: PgPool,
}

impl PgForumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, table: &TableSpec, scope: &Scope) -> RepoResult<u64> {
        let sql = table.count_sql(scope.pattern.is_some());
        let mut query = sqlx::query_scalar::<Postgres, i64>(&sql).bind(scope.parent_id);
        if let Some(pattern) = &scope.pattern {
            query = query.bind(pattern.as_str());
        }

        let total = query.fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    async fn page<T>(
        &self,
        table: &TableSpec,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = table.page_sql(scope.pattern.is_some(), order);
        let mut query = sqlx::query_as::<Postgres, T>(&sql).bind(scope.parent_id);
        if let Some(pattern) = &scope.pattern {
            query = query.bind(pattern.as_str());
        }

        let rows = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn soft_delete(&self, table: &TableSpec, id: i64) -> RepoResult<()> {
        let result = sqlx::query(&table.soft_delete_sql())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(table = table.name, id, "Nothing to delete");
        }
        Ok(())
    }
}

#[async_trait]
impl ForumRepository for PgForumRepository {
    async fn ensure_schema(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn create_thread(&self, new_thread: NewThread) -> RepoResult<Thread> {
        let mut tx = self.pool.begin().await?;

        let thread = sqlx::query_as::<_, Thread>(
            r#"
            INSERT INTO threads (container_id, user_id, title)
            VALUES ($1, $2, $3)
            RETURNING id, container_id, user_id, title, created_at
            "#,
        )
        .bind(new_thread.container_id)
        .bind(new_thread.user_id)
        .bind(&new_thread.title)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(text) = &new_thread.first_message {
            sqlx::query(
                r#"
                INSERT INTO messages (thread_id, user_id, text)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(thread.id)
            .bind(new_thread.user_id)
            .bind(text)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(thread)
    }

    async fn create_message(&self, new_message: NewMessage) -> RepoResult<Message> {
        // Deleted threads stay in the table, so the foreign key alone does not
        // keep messages out of them.
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (thread_id, user_id, text)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM threads WHERE id = $1 AND deleted_at IS NULL)
            RETURNING id, thread_id, user_id, text, created_at
            "#,
        )
        .bind(new_message.thread_id)
        .bind(new_message.user_id)
        .bind(&new_message.text)
        .fetch_optional(&self.pool)
        .await?;

        message.ok_or(RepoError::NotFound)
    }

    async fn find_thread(&self, id: i64) -> RepoResult<Thread> {
        let thread = sqlx::query_as::<_, Thread>(
            r#"
            SELECT id, container_id, user_id, title, created_at
            FROM threads
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        thread.ok_or(RepoError::NotFound)
    }

    async fn count_threads(&self, scope: &Scope) -> RepoResult<u64> {
        self.count(&THREADS, scope).await
    }

    async fn find_threads(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Thread>> {
        self.page(&THREADS, scope, offset, limit, order).await
    }

    async fn count_messages(&self, scope: &Scope) -> RepoResult<u64> {
        self.count(&MESSAGES, scope).await
    }

    async fn find_messages(
        &self,
        scope: &Scope,
        offset: i64,
        limit: i64,
        order: SortOrder,
    ) -> RepoResult<Vec<Message>> {
        self.page(&MESSAGES, scope, offset, limit, order).await
    }

    async fn delete_thread(&self, id: i64) -> RepoResult<()> {
        self.soft_delete(&THREADS, id).await
    }

    async fn delete_message(&self, id: i64) -> RepoResult<()> {
        self.soft_delete(&MESSAGES, id).await
    }
}
