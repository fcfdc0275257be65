//! Todo list kept in a JSON store
//!
//! Layout in the store:
//! - `metadata` holds `{"nextId": n}`, the id the next todo will get
//! - `todos/{id}` holds one todo

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::StoreClient;
use crate::error::{Error, Result};
use crate::store::JsonStore;

/// Key of the todo collection
pub const TODOS_KEY: &str = "todos";
/// Key of the list [`Metadata`]
pub const METADATA_KEY: &str = "metadata";
/// Key of the next free id inside the metadata
pub const NEXT_ID_KEY: &str = "metadata/nextId";

/// A single todo item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Todo {
    /// Id assigned from `nextId` when the todo was added
    pub id: u64,
    /// What needs doing
    pub title: String,
    /// Completed todos are hidden from listings
    pub done: bool,
    /// Creation time, RFC 3339 on the wire
    pub date: DateTime<Utc>,
}

impl Todo {
    /// An open todo created now
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            done: false,
            date: Utc::now(),
        }
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.id, self.title)
    }
}

/// Bookkeeping stored next to the todos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Id the next added todo will get
    #[serde(rename = "nextId", default)]
    pub next_id: u64,
}

/// The `todos` collection as the store hands it back.
///
/// Stores that map integer keys onto arrays return a list with `null` holes
/// for deleted ids; others return an object keyed by id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Collection {
    List(Vec<Option<Todo>>),
    Map(BTreeMap<String, Option<Todo>>),
}

impl Collection {
    /// Open todos with a title, ordered by id.
    fn into_open(self) -> Vec<Todo> {
        let todos: Vec<Todo> = match self {
            Collection::List(list) => list.into_iter().flatten().collect(),
            Collection::Map(map) => map.into_values().flatten().collect(),
        };
        let mut open: Vec<Todo> = todos
            .into_iter()
            .filter(|t| !t.done && !t.title.is_empty())
            .collect();
        open.sort_by_key(|t| t.id);
        open
    }
}

fn todo_key(id: u64) -> String {
    format!("{}/{}", TODOS_KEY, id)
}

/// Todo list operations on top of any [`JsonStore`], a [`StoreClient`] by default
#[derive(Debug)]
pub struct TodoList<S = StoreClient> {
    store: S,
    metadata: Metadata,
}

impl<S: JsonStore> TodoList<S> {
    /// Load the list metadata, seeding it when the store has none yet.
    pub async fn open(store: S) -> Result<Self> {
        let metadata = match store.get_optional::<Metadata>(METADATA_KEY).await? {
            Some(metadata) => metadata,
            None => {
                info!("No todo metadata in store, seeding");
                let metadata = Metadata::default();
                store.put(METADATA_KEY, &metadata).await?;
                metadata
            }
        };
        debug!("Opened todo list, next id {}", metadata.next_id);
        Ok(Self { store, metadata })
    }

    /// Metadata as last read or written by this list
    pub fn metadata(&self) -> Metadata {
        self.metadata
    }

    async fn reserve_id(&mut self) -> Result<u64> {
        let id = self.metadata.next_id;
        self.store.put(NEXT_ID_KEY, &(id + 1)).await?;
        self.metadata.next_id = id + 1;
        Ok(id)
    }

    /// Add a todo and return it with its assigned id.
    pub async fn add(&mut self, title: &str) -> Result<Todo> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidRequest("No todo title provided".to_string()));
        }
        let id = self.reserve_id().await?;
        let todo = Todo::new(id, title);
        self.store.post(&todo_key(id), &todo).await?;
        Ok(todo)
    }

    /// Open todos, ordered by id. An empty store is an empty list.
    pub async fn list(&self) -> Result<Vec<Todo>> {
        Ok(self
            .store
            .get_optional::<Collection>(TODOS_KEY)
            .await?
            .map(Collection::into_open)
            .unwrap_or_default())
    }

    /// Mark a todo done and read it back. `None` when the id holds no todo.
    pub async fn complete(&self, id: u64) -> Result<Option<Todo>> {
        let key = todo_key(id);
        self.store.put(&format!("{}/done", key), &true).await?;
        self.store.get_optional(&key).await
    }

    /// Delete a todo. Removing an id that holds nothing succeeds.
    pub async fn remove(&self, id: u64) -> Result<()> {
        self.store.delete(&todo_key(id)).await
    }
}
