//! In-memory user store

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Todo, User};

/// In-memory store owning every user record and, through them, every todo.
///
/// Users are kept in a map keyed by id with a secondary username index for
/// claim resolution. Todos live inside their owner's `Vec` in insertion
/// order; removal from that `Vec` is the only deletion path. State lives for
/// the process lifetime only.
#[derive(Debug, Default)]
pub struct UserStore {
    users: HashMap<Uuid, User>,
    username_index: HashMap<String, Uuid>,
}

impl UserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new user with a fresh id and an empty todo collection
    pub fn create_user(&mut self, name: &str, username: &str) -> ApiResult<User> {
        if self.username_index.contains_key(username) {
            return Err(ApiError::UsernameTaken);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: username.to_string(),
            pro: false,
            todos: Vec::new(),
        };

        info!(username = %user.username, user_id = %user.id, "Created user");

        self.username_index.insert(user.username.clone(), user.id);
        self.users.insert(user.id, user.clone());

        Ok(user)
    }

    /// Find a user by the username identity claim
    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.username_index
            .get(username)
            .and_then(|id| self.users.get(id))
    }

    /// Find a user by id
    pub fn find_by_id(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    /// Flip a user's plan to pro; one-way, fails if already pro
    pub fn upgrade_to_pro(&mut self, user_id: Uuid) -> ApiResult<User> {
        let user = self.users.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;

        if user.pro {
            return Err(ApiError::AlreadyPro);
        }

        user.pro = true;
        info!(user_id = %user.id, "Upgraded user to pro");

        Ok(user.clone())
    }

    /// Append a new todo to the owner's collection
    pub fn create_todo(
        &mut self,
        user_id: Uuid,
        title: &str,
        deadline: DateTime<Utc>,
    ) -> ApiResult<Todo> {
        let user = self.users.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;

        let todo = Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            deadline,
            done: false,
            created_at: Utc::now(),
        };

        info!(user_id = %user.id, todo_id = %todo.id, "Created todo");

        user.todos.push(todo.clone());

        Ok(todo)
    }

    /// Overwrite a todo's title and deadline; id, done and created_at are untouched
    pub fn update_todo(
        &mut self,
        user_id: Uuid,
        todo_id: Uuid,
        title: &str,
        deadline: DateTime<Utc>,
    ) -> ApiResult<Todo> {
        let todo = self.todo_mut(user_id, todo_id)?;

        todo.title = title.to_string();
        todo.deadline = deadline;

        Ok(todo.clone())
    }

    /// Set a todo's done flag; one-way, idempotent if already done
    pub fn mark_done(&mut self, user_id: Uuid, todo_id: Uuid) -> ApiResult<Todo> {
        let todo = self.todo_mut(user_id, todo_id)?;

        todo.done = true;

        Ok(todo.clone())
    }

    /// Remove a todo from its owner's collection
    ///
    /// Re-checks presence by id even though callers resolve the todo first.
    pub fn delete_todo(&mut self, user_id: Uuid, todo_id: Uuid) -> ApiResult<()> {
        let user = self.users.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;

        let index = user
            .todos
            .iter()
            .position(|todo| todo.id == todo_id)
            .ok_or(ApiError::TodoNotFound)?;

        user.todos.remove(index);

        Ok(())
    }

    /// List the owner's todos in insertion order, unfiltered
    pub fn list_todos(&self, user_id: Uuid) -> ApiResult<Vec<Todo>> {
        let user = self.users.get(&user_id).ok_or(ApiError::UserNotFound)?;

        Ok(user.todos.clone())
    }

    fn todo_mut(&mut self, user_id: Uuid, todo_id: Uuid) -> ApiResult<&mut Todo> {
        let user = self.users.get_mut(&user_id).ok_or(ApiError::UserNotFound)?;

        user.todos
            .iter_mut()
            .find(|todo| todo.id == todo_id)
            .ok_or(ApiError::TodoNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 12, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_user_starts_free_with_no_todos() {
        let mut store = UserStore::new();

        let user = store.create_user("Ada Lovelace", "ada").unwrap();

        assert!(!user.pro);
        assert!(user.todos.is_empty());
        assert_eq!(store.find_by_username("ada").unwrap().id, user.id);
        assert_eq!(store.find_by_id(user.id).unwrap().username, "ada");
    }

    #[test]
    fn duplicate_username_is_rejected_and_store_unchanged() {
        let mut store = UserStore::new();
        let first = store.create_user("Ada Lovelace", "ada").unwrap();

        let result = store.create_user("Ada Byron", "ada");

        assert_eq!(result.unwrap_err(), ApiError::UsernameTaken);
        assert_eq!(store.find_by_username("ada").unwrap().id, first.id);
    }

    #[test]
    fn upgrade_to_pro_is_one_way() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();

        let upgraded = store.upgrade_to_pro(user.id).unwrap();
        assert!(upgraded.pro);

        let second = store.upgrade_to_pro(user.id);
        assert_eq!(second.unwrap_err(), ApiError::AlreadyPro);
        assert!(store.find_by_id(user.id).unwrap().pro);
    }

    #[test]
    fn todos_are_listed_in_insertion_order() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();

        for title in ["first", "second", "third"] {
            store.create_todo(user.id, title, deadline()).unwrap();
        }

        let titles: Vec<String> = store
            .list_todos(user.id)
            .unwrap()
            .into_iter()
            .map(|todo| todo.title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn update_overwrites_title_and_deadline_only() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();
        let todo = store.create_todo(user.id, "draft", deadline()).unwrap();

        let new_deadline = Utc.with_ymd_and_hms(2027, 1, 15, 9, 30, 0).unwrap();
        let updated = store
            .update_todo(user.id, todo.id, "final", new_deadline)
            .unwrap();

        assert_eq!(updated.id, todo.id);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.deadline, new_deadline);
        assert_eq!(updated.created_at, todo.created_at);
        assert!(!updated.done);
    }

    #[test]
    fn mark_done_is_idempotent() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();
        let todo = store.create_todo(user.id, "ship it", deadline()).unwrap();

        assert!(store.mark_done(user.id, todo.id).unwrap().done);
        assert!(store.mark_done(user.id, todo.id).unwrap().done);
    }

    #[test]
    fn delete_removes_the_todo_and_second_delete_fails() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();
        let todo = store.create_todo(user.id, "temp", deadline()).unwrap();

        store.delete_todo(user.id, todo.id).unwrap();
        assert!(store.list_todos(user.id).unwrap().is_empty());

        let second = store.delete_todo(user.id, todo.id);
        assert_eq!(second.unwrap_err(), ApiError::TodoNotFound);
    }

    #[test]
    fn unknown_todo_id_on_update_is_not_found() {
        let mut store = UserStore::new();
        let user = store.create_user("Ada Lovelace", "ada").unwrap();

        let result = store.update_todo(user.id, Uuid::new_v4(), "nope", deadline());

        assert_eq!(result.unwrap_err(), ApiError::TodoNotFound);
    }
}
