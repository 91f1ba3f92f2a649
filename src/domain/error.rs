use thiserror::Error;

use super::todo::TodoId;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("could not decode stored todos: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("could not persist todos: {0}")]
    Persist(#[source] std::io::Error),
    #[error("repository is shut down")]
    Closed,
    #[error("storage backend failure: {0}")]
    Backend(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
