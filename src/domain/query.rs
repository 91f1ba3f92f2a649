//! Read-side query model and the filter → sort → paginate pipeline.
//!
//! Each stage is a pure function over owned todos so that backends which keep
//! the collection in memory can share them.

use std::cmp::Reverse;
use std::ops::Range;

use super::todo::Todo;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Id,
    Title,
    Description,
    DueDate,
}

impl SortBy {
    /// Parses the `sortBy` query value.
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "dueDate" => Some(Self::DueDate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortType {
    #[default]
    Ascending,
    Descending,
}

impl SortType {
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Ascending),
            "desc" => Some(Self::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sorting {
    pub sort_by: SortBy,
    pub sort_type: SortType,
}

impl Sorting {
    pub fn new(sort_by: SortBy, sort_type: SortType) -> Self { Self { sort_by, sort_type } }
}

/// `limit <= 0` disables pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, limit: 0 } }
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self { Self { page, limit } }

    /// Window `[start, end)` with both ends floored at zero, or `None` when
    /// pagination is disabled.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        if self.limit <= 0 {
            return None;
        }
        let start = self.page.saturating_sub(1).saturating_mul(self.limit);
        let end = start.saturating_add(self.limit);
        Some((start.max(0), end.max(0)))
    }

    /// Like [`Self::bounds`], additionally clamped to `len`.
    pub fn window(&self, len: usize) -> Option<Range<usize>> {
        let (start, end) = self.bounds()?;
        let clamp = |v: i64| usize::try_from(v).map_or(len, |v| v.min(len));
        Some(clamp(start)..clamp(end))
    }
}

/// Case-insensitive substring match on title or description. An empty filter matches everything.
pub fn matches_filter(todo: &Todo, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();
    todo.title.to_lowercase().contains(&needle) || todo.description.to_lowercase().contains(&needle)
}

/// Stable sort; equal keys keep their relative order in either direction.
pub fn sort_todos(todos: &mut [Todo], sorting: Sorting) {
    match sorting.sort_by {
        SortBy::Id => sort_by_key_in(todos, sorting.sort_type, |t| t.id),
        SortBy::Title => sort_by_key_in(todos, sorting.sort_type, |t| t.title.to_lowercase()),
        SortBy::Description => sort_by_key_in(todos, sorting.sort_type, |t| t.description.to_lowercase()),
        SortBy::DueDate => sort_by_key_in(todos, sorting.sort_type, |t| t.due_date.clone()),
    }
}

fn sort_by_key_in<K, F>(todos: &mut [Todo], sort_type: SortType, mut key: F)
where
    K: Ord,
    F: FnMut(&Todo) -> K,
{
    match sort_type {
        SortType::Ascending => todos.sort_by_cached_key(key),
        SortType::Descending => todos.sort_by_cached_key(|t| Reverse(key(t))),
    }
}

pub fn paginate(mut todos: Vec<Todo>, pagination: Pagination) -> Vec<Todo> {
    if let Some(range) = pagination.window(todos.len()) {
        todos.truncate(range.end);
        todos.drain(..range.start);
    }
    todos
}

/// Runs the full pipeline over a borrowed collection.
pub fn select<'a, I>(todos: I, filter: &str, sorting: Sorting, pagination: Pagination) -> Vec<Todo>
where
    I: IntoIterator<Item = &'a Todo>,
{
    let mut selected: Vec<Todo> = todos.into_iter().filter(|t| matches_filter(t, filter)).cloned().collect();
    sort_todos(&mut selected, sorting);
    paginate(selected, pagination)
}
