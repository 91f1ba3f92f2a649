use async_trait::async_trait;

use super::error::RepositoryResult;
use super::query::{Pagination, Sorting};
use super::todo::{NewTodo, Todo, TodoId};

/// Storage contract shared by every backend. Filtering, sorting and
/// pagination must follow the semantics in [`super::query`].
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    /// Assigns a fresh id, stores the todo and returns it.
    async fn create(&self, input: NewTodo) -> RepositoryResult<Todo>;
    async fn get(&self, id: TodoId) -> RepositoryResult<Todo>;
    async fn list(&self, filter: &str, sorting: Sorting, pagination: Pagination) -> RepositoryResult<Vec<Todo>>;
    /// Replaces every field of the todo with the same id.
    async fn update(&self, todo: Todo) -> RepositoryResult<Todo>;
    async fn delete(&self, id: TodoId) -> RepositoryResult<()>;
    /// Releases the backing resource. A second call yields `RepositoryError::Closed`.
    async fn shutdown(&self) -> RepositoryResult<()>;
}
