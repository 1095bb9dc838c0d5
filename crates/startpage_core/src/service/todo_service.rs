//! Todo use-case service.
//!
//! # Responsibility
//! - Validate drafts and apply create/edit/delete/toggle to the stored list.
//! - Produce the display ordering (`created_at` descending).
//!
//! # Invariants
//! - Validation runs before any storage access.
//! - Every mutation is load -> modify -> store under one writer lock, so
//!   concurrent mutations never apply to a stale snapshot.
//! - Each mutation issues exactly one storage write.
//! - Indices are storage indices, never display positions.

use crate::clock::Clock;
use crate::model::todo::{Timestamp, Todo, TodoDraft, TodoStatus, ValidationError};
use crate::repo::ListRepository;
use crate::service::confirm::Confirm;
use crate::storage::{keys, SharedStorage, StorageError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

const DELETE_PROMPT: &str = "Delete this task?";

#[derive(Debug)]
pub enum TodoServiceError {
    Validation(ValidationError),
    /// `index` does not address a stored todo.
    NotFound { index: usize, len: usize },
    Storage(StorageError),
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { index, len } => {
                write!(f, "todo not found at index {index} (list has {len})")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for TodoServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for TodoServiceError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

pub type TodoResult<T> = Result<T, TodoServiceError>;

pub struct TodoService {
    repo: ListRepository<Todo>,
    clock: Arc<dyn Clock>,
    writer: Mutex<()>,
}

impl TodoService {
    pub fn new(storage: SharedStorage, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo: ListRepository::new(storage, keys::TODOS),
            clock,
            writer: Mutex::new(()),
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now_millis()
    }

    /// Status of `todo` at the service clock's current instant.
    pub fn status_of(&self, todo: &Todo) -> TodoStatus {
        todo.status(self.now())
    }

    /// Creates a todo, or edits the one at `edit_index`.
    ///
    /// Edits keep the stored `created_at` and `completed` values.
    ///
    /// # Errors
    /// - `Validation` for a blank title or a non-increasing window; the
    ///   stored list is untouched.
    /// - `NotFound` when `edit_index` is out of range.
    pub async fn save(&self, draft: TodoDraft, edit_index: Option<usize>) -> TodoResult<Todo> {
        let mode = if edit_index.is_some() { "edit" } else { "create" };
        let draft = draft.validated().inspect_err(|err| {
            info!("event=todo_save module=todo status=rejected mode={mode} reason={err}");
        })?;

        let started_at = Instant::now();
        let result = self.mutate(|todos, now| match edit_index {
            Some(index) => {
                let len = todos.len();
                let existing = todos
                    .get_mut(index)
                    .ok_or(TodoServiceError::NotFound { index, len })?;
                existing.apply_draft(draft);
                Ok((index, existing.clone()))
            }
            None => {
                let todo = Todo::from_draft(draft, now);
                todos.push(todo.clone());
                Ok((todos.len() - 1, todo))
            }
        });
        let result = result.await;
        log_mutation("todo_save", mode, &result, started_at);
        result.map(|(_, todo)| todo)
    }

    /// Removes the todo at `index` once `confirm` agrees.
    ///
    /// Returns `Ok(false)` without touching storage when declined.
    pub async fn delete(&self, index: usize, confirm: &dyn Confirm) -> TodoResult<bool> {
        if !confirm.confirm(DELETE_PROMPT) {
            info!("event=todo_delete module=todo status=declined index={index}");
            return Ok(false);
        }

        let started_at = Instant::now();
        let result = self
            .mutate(|todos, _| {
                if index >= todos.len() {
                    return Err(TodoServiceError::NotFound {
                        index,
                        len: todos.len(),
                    });
                }
                let removed = todos.remove(index);
                Ok((index, removed))
            })
            .await;
        log_mutation("todo_delete", "delete", &result, started_at);
        result.map(|_| true)
    }

    /// Flips completion of the todo at `index`.
    pub async fn toggle_complete(&self, index: usize) -> TodoResult<Todo> {
        let started_at = Instant::now();
        let result = self
            .mutate(|todos, _| {
                let len = todos.len();
                let todo = todos
                    .get_mut(index)
                    .ok_or(TodoServiceError::NotFound { index, len })?;
                todo.completed = !todo.completed;
                Ok((index, todo.clone()))
            })
            .await;
        log_mutation("todo_toggle", "toggle", &result, started_at);
        result.map(|(_, todo)| todo)
    }

    /// Reads the todo at storage `index`, e.g. to pre-fill an edit form.
    pub async fn get(&self, index: usize) -> TodoResult<Todo> {
        let mut todos = self.repo.load().await?;
        let len = todos.len();
        if index >= len {
            return Err(TodoServiceError::NotFound { index, len });
        }
        Ok(todos.swap_remove(index))
    }

    /// Loads all todos in display order.
    pub async fn list(&self) -> TodoResult<TodoList> {
        Ok(TodoList::new(self.repo.load().await?))
    }

    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<Todo>, Timestamp) -> TodoResult<T>,
    ) -> TodoResult<T> {
        let _writer = self.writer.lock().await;
        let mut todos = self.repo.load().await?;
        let outcome = change(&mut todos, self.now())?;
        self.repo.store(&todos).await?;
        Ok(outcome)
    }
}

fn log_mutation<T>(
    event: &str,
    mode: &str,
    result: &TodoResult<(usize, T)>,
    started_at: Instant,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok((index, _)) => info!(
            "event={event} module=todo status=ok mode={mode} index={index} duration_ms={duration_ms}"
        ),
        Err(TodoServiceError::NotFound { index, len }) => info!(
            "event={event} module=todo status=not_found mode={mode} index={index} len={len}"
        ),
        Err(err) => error!(
            "event={event} module=todo status=error mode={mode} duration_ms={duration_ms} error={err}"
        ),
    }
}

/// Todos in display order: `created_at` descending, ties in storage order.
///
/// Iteration borrows the list and can be restarted any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    todos: Vec<Todo>,
    order: Vec<usize>,
}

impl TodoList {
    pub fn new(todos: Vec<Todo>) -> Self {
        let mut order = (0..todos.len()).collect::<Vec<_>>();
        order.sort_by(|a, b| todos[*b].created_at.cmp(&todos[*a].created_at));
        Self { todos, order }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn iter(&self) -> TodoIter<'_> {
        TodoIter {
            list: self,
            position: 0,
        }
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = TodoEntry<'a>;
    type IntoIter = TodoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One displayed todo with the storage index used to address it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoEntry<'a> {
    pub index: usize,
    pub todo: &'a Todo,
}

impl TodoEntry<'_> {
    pub fn status(&self, now: Timestamp) -> TodoStatus {
        self.todo.status(now)
    }
}

pub struct TodoIter<'a> {
    list: &'a TodoList,
    position: usize,
}

impl<'a> Iterator for TodoIter<'a> {
    type Item = TodoEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.list.order.get(self.position)?;
        self.position += 1;
        Some(TodoEntry {
            index,
            todo: &self.list.todos[index],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.order.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TodoIter<'_> {}
