use crate::domain::error::RepositoryResult;
use crate::domain::query::{Pagination, Sorting};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{NewTodo, Todo, TodoId};
use async_trait::async_trait;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn create(&self, input: NewTodo) -> RepositoryResult<Todo>;
    async fn get(&self, id: TodoId) -> RepositoryResult<Todo>;
    async fn list(&self, filter: &str, sorting: Sorting, pagination: Pagination) -> RepositoryResult<Vec<Todo>>;
    async fn update(&self, todo: Todo) -> RepositoryResult<Todo>;
    async fn delete(&self, id: TodoId) -> RepositoryResult<()>;
    async fn shutdown(&self) -> RepositoryResult<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn create(&self, input: NewTodo) -> RepositoryResult<Todo> {
        let todo = self.repo.create(input).await?;
        tracing::info!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> RepositoryResult<Todo> { self.repo.get(id).await }

    async fn list(&self, filter: &str, sorting: Sorting, pagination: Pagination) -> RepositoryResult<Vec<Todo>> {
        self.repo.list(filter, sorting, pagination).await
    }

    // Existence is checked first so a missing id never reaches the write path.
    async fn update(&self, todo: Todo) -> RepositoryResult<Todo> {
        self.repo.get(todo.id).await?;
        let todo = self.repo.update(todo).await?;
        tracing::info!(id = %todo.id, "todo updated");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> RepositoryResult<()> {
        self.repo.get(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(%id, "todo deleted");
        Ok(())
    }

    async fn shutdown(&self) -> RepositoryResult<()> {
        self.repo.shutdown().await?;
        tracing::info!("repository shut down");
        Ok(())
    }
}
