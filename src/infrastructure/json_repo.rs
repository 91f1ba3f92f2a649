use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{
    error::{RepositoryError, RepositoryResult},
    query::{self, Pagination, Sorting},
    repository::TodoRepository,
    todo::{NewTodo, Todo, TodoId},
};

/// A byte store that can be rewound and emptied in place.
pub trait SnapshotFile: Read + Write + Seek + Send + 'static {
    /// Drops every byte; the cursor position is left to the caller.
    fn truncate(&mut self) -> io::Result<()>;

    fn sync(&mut self) -> io::Result<()> { Ok(()) }
}

impl SnapshotFile for File {
    fn truncate(&mut self) -> io::Result<()> { self.set_len(0) }

    fn sync(&mut self) -> io::Result<()> { self.sync_data() }
}

impl SnapshotFile for Cursor<Vec<u8>> {
    fn truncate(&mut self) -> io::Result<()> {
        self.get_mut().clear();
        Ok(())
    }
}

/// Todo repository kept in memory and mirrored, whole, to a single JSON file
/// after every mutation. One lock covers both the collection and the file.
pub struct JsonTodoRepository<F: SnapshotFile = File> {
    inner: Arc<Mutex<Store<F>>>,
}

impl<F: SnapshotFile> Clone for JsonTodoRepository<F> {
    fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

struct Store<F> {
    todos: Vec<Todo>,
    file: Option<F>,
}

impl JsonTodoRepository<File> {
    /// Opens `path` for reading and writing, creating it (and its parent
    /// directories) when missing. Existing content is never truncated here.
    pub fn open_path(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(RepositoryError::Persist)?;
            }
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(RepositoryError::Persist)?;
        Self::open(file)
    }
}

impl<F: SnapshotFile> JsonTodoRepository<F> {
    /// Loads the snapshot held by `file`. Zero bytes, whitespace or `null`
    /// yield an empty collection.
    pub fn open(mut file: F) -> RepositoryResult<Self> {
        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(0)).map_err(RepositoryError::Persist)?;
        file.read_to_end(&mut bytes).map_err(RepositoryError::Persist)?;

        let todos = if bytes.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice::<Option<Vec<Todo>>>(&bytes)
                .map_err(RepositoryError::Decode)?
                .unwrap_or_default()
        };

        Ok(Self { inner: Arc::new(Mutex::new(Store { todos, file: Some(file) })) })
    }

    // Every exit path leaves `todos` matching the last good snapshot, so a
    // poisoned lock holds nothing half-written.
    fn lock(&self) -> MutexGuard<'_, Store<F>> { self.inner.lock().unwrap_or_else(PoisonError::into_inner) }
}

impl<F: SnapshotFile> Store<F> {
    fn ensure_open(&self) -> RepositoryResult<()> {
        if self.file.is_some() { Ok(()) } else { Err(RepositoryError::Closed) }
    }

    fn position(&self, id: TodoId) -> RepositoryResult<usize> {
        self.todos.iter().position(|t| t.id == id).ok_or(RepositoryError::NotFound(id))
    }

    fn fresh_id(&self) -> TodoId { self.fresh_id_with(TodoId::random) }

    /// Draws from `source` until the id is not held by any live todo.
    fn fresh_id_with(&self, mut source: impl FnMut() -> TodoId) -> TodoId {
        loop {
            let candidate = source();
            if !self.todos.iter().any(|t| t.id == candidate) {
                return candidate;
            }
        }
    }

    /// Replaces the file content with the current collection.
    fn persist(&mut self) -> RepositoryResult<()> {
        let file = self.file.as_mut().ok_or(RepositoryError::Closed)?;
        let mut payload = serde_json::to_vec(&self.todos).map_err(|e| RepositoryError::Persist(e.into()))?;
        payload.push(b'\n');

        file.truncate().map_err(RepositoryError::Persist)?;
        file.seek(SeekFrom::Start(0)).map_err(RepositoryError::Persist)?;
        file.write_all(&payload).map_err(RepositoryError::Persist)?;
        file.flush().map_err(RepositoryError::Persist)?;
        file.sync().map_err(RepositoryError::Persist)
    }

    fn insert(&mut self, input: NewTodo) -> RepositoryResult<Todo> {
        self.ensure_open()?;
        let todo = input.with_id(self.fresh_id());
        self.todos.push(todo.clone());
        if let Err(e) = self.persist() {
            self.todos.pop();
            return Err(e);
        }
        Ok(todo)
    }

    fn replace(&mut self, todo: Todo) -> RepositoryResult<Todo> {
        self.ensure_open()?;
        let idx = self.position(todo.id)?;
        let previous = std::mem::replace(&mut self.todos[idx], todo.clone());
        if let Err(e) = self.persist() {
            self.todos[idx] = previous;
            return Err(e);
        }
        Ok(todo)
    }

    fn remove(&mut self, id: TodoId) -> RepositoryResult<()> {
        self.ensure_open()?;
        let idx = self.position(id)?;
        let removed = self.todos.remove(idx);
        if let Err(e) = self.persist() {
            self.todos.insert(idx, removed);
            return Err(e);
        }
        Ok(())
    }

    fn close(&mut self) -> RepositoryResult<()> {
        let mut file = self.file.take().ok_or(RepositoryError::Closed)?;
        file.flush().map_err(RepositoryError::Persist)
    }
}

#[async_trait]
impl<F: SnapshotFile> TodoRepository for JsonTodoRepository<F> {
    async fn create(&self, input: NewTodo) -> RepositoryResult<Todo> { self.lock().insert(input) }

    async fn get(&self, id: TodoId) -> RepositoryResult<Todo> {
        let store = self.lock();
        store.ensure_open()?;
        let idx = store.position(id)?;
        Ok(store.todos[idx].clone())
    }

    async fn list(&self, filter: &str, sorting: Sorting, pagination: Pagination) -> RepositoryResult<Vec<Todo>> {
        let store = self.lock();
        store.ensure_open()?;
        Ok(query::select(&store.todos, filter, sorting, pagination))
    }

    async fn update(&self, todo: Todo) -> RepositoryResult<Todo> { self.lock().replace(todo) }

    async fn delete(&self, id: TodoId) -> RepositoryResult<()> { self.lock().remove(id) }

    async fn shutdown(&self) -> RepositoryResult<()> { self.lock().close() }
}
