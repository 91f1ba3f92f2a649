use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TodoId(pub i64);

impl TodoId {
    /// Draws 32 random bits from a v4 UUID. Callers check the result against live ids.
    pub fn random() -> Self {
        let (time_low, _, _, _) = Uuid::new_v4().as_fields();
        Self(i64::from(time_low))
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    /// Missing text fields decode as empty, matching `NewTodo`.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Opaque; ordered lexicographically.
    #[serde(default)]
    pub due_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub due_date: String,
}

impl NewTodo {
    pub fn with_id(self, id: TodoId) -> Todo {
        Todo { id, title: self.title, description: self.description, due_date: self.due_date }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_missing_text_fields_decode_empty() {
        let todo: Todo = serde_json::from_str(r#"{"id":1,"title":"x"}"#).unwrap();
        assert_eq!(todo, Todo { id: TodoId(1), title: "x".into(), description: String::new(), due_date: String::new() });
        assert!(serde_json::from_str::<Todo>(r#"{"title":"x"}"#).is_err());
    }
}
