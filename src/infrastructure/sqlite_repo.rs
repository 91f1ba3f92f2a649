use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use crate::domain::{
    error::{RepositoryError, RepositoryResult},
    query::{Pagination, SortBy, SortType, Sorting},
    repository::TodoRepository,
    todo::{NewTodo, Todo, TodoId},
};

const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> RepositoryResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url).map_err(db_error)?.create_if_missing(true);
        // An in-memory database lives only as long as its connection.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await.map_err(db_error)?;
        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn init(&self) -> RepositoryResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id INTEGER NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                due_date TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn create(&self, input: NewTodo) -> RepositoryResult<Todo> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = TodoId::random();
            let inserted = sqlx::query("INSERT INTO todos (id, title, description, due_date) VALUES (?1, ?2, ?3, ?4)")
                .bind(id.0)
                .bind(&input.title)
                .bind(&input.description)
                .bind(&input.due_date)
                .execute(&*self.pool)
                .await;
            match inserted {
                Ok(_) => return Ok(input.with_id(id)),
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => continue,
                Err(e) => return Err(db_error(e)),
            }
        }
        Err(RepositoryError::Backend("could not allocate a unique todo id".into()))
    }

    async fn get(&self, id: TodoId) -> RepositoryResult<Todo> {
        let row = sqlx::query("SELECT id, title, description, due_date FROM todos WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await
            .map_err(db_error)?;
        row.map(row_to_todo).ok_or(RepositoryError::NotFound(id))
    }

    async fn list(&self, filter: &str, sorting: Sorting, pagination: Pagination) -> RepositoryResult<Vec<Todo>> {
        let (offset, limit) = match pagination.bounds() {
            Some((start, end)) if end <= start => return Ok(Vec::new()),
            Some((start, end)) => (start, end - start),
            None => (0, -1),
        };
        let sql = format!(
            "SELECT id, title, description, due_date FROM todos
             WHERE ?1 = '' OR title LIKE ?2 ESCAPE '\\' OR description LIKE ?2 ESCAPE '\\'
             ORDER BY {} {}, seq ASC
             LIMIT ?3 OFFSET ?4",
            order_column(sorting.sort_by),
            match sorting.sort_type { SortType::Ascending => "ASC", SortType::Descending => "DESC" },
        );
        let rows = sqlx::query(&sql)
            .bind(filter)
            .bind(like_pattern(filter))
            .bind(limit)
            .bind(offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(row_to_todo).collect())
    }

    async fn update(&self, todo: Todo) -> RepositoryResult<Todo> {
        let result = sqlx::query("UPDATE todos SET title = ?2, description = ?3, due_date = ?4 WHERE id = ?1")
            .bind(todo.id.0)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(&todo.due_date)
            .execute(&*self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(todo.id));
        }
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }
        Ok(())
    }

    async fn shutdown(&self) -> RepositoryResult<()> {
        if self.pool.is_closed() {
            return Err(RepositoryError::Closed);
        }
        self.pool.close().await;
        Ok(())
    }
}

fn order_column(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::Id => "id",
        SortBy::Title => "title COLLATE NOCASE",
        SortBy::Description => "description COLLATE NOCASE",
        SortBy::DueDate => "due_date",
    }
}

// LIKE is already case-insensitive for ASCII in SQLite; only the wildcards need escaping.
fn like_pattern(filter: &str) -> String {
    let mut pattern = String::with_capacity(filter.len() + 2);
    pattern.push('%');
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn row_to_todo(row: SqliteRow) -> Todo {
    Todo {
        id: TodoId(row.get("id")),
        title: row.get("title"),
        description: row.get("description"),
        due_date: row.get("due_date"),
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::PoolClosed => RepositoryError::Closed,
        other => RepositoryError::Backend(other.to_string()),
    }
}
