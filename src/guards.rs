//! Request validation pipeline
//!
//! Each route runs an ordered list of guards before touching the store. A
//! guard either enriches the [`GuardContext`] with a resolved record id or
//! short-circuits the request with an [`ApiError`]; the first failure wins
//! and no later guard runs. Mutations happen only after the whole list has
//! passed.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::FREE_PLAN_TODO_LIMIT;
use crate::store::UserStore;

/// Per-request context threaded through the guard chain by value
#[derive(Debug, Default, Clone)]
pub struct GuardContext {
    /// Identity claim from the `username` header, if present
    pub username: Option<String>,
    /// Raw id segment from the request path, if the route carries one
    pub path_id: Option<String>,
    /// User resolved by an earlier guard
    pub user_id: Option<Uuid>,
    /// Todo resolved by an earlier guard
    pub todo_id: Option<Uuid>,
}

impl GuardContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_path_id(mut self, path_id: impl Into<String>) -> Self {
        self.path_id = Some(path_id.into());
        self
    }

    /// Id of the user a guard resolved earlier in the chain
    pub fn resolved_user(&self) -> ApiResult<Uuid> {
        self.user_id.ok_or(ApiError::UserNotFound)
    }

    /// Id of the todo a guard resolved earlier in the chain
    pub fn resolved_todo(&self) -> ApiResult<Uuid> {
        self.todo_id.ok_or(ApiError::TodoNotFound)
    }
}

/// A single validation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Resolve the user behind the `username` header claim
    ResolveUserByUsername,
    /// Enforce the free-plan todo limit; pro users bypass the count check
    CheckTodoQuota,
    /// Validate the path id as a UUID, then resolve user and todo
    ResolveTodoById,
    /// Resolve the user behind the path id
    ResolveUserByPathId,
}

impl Guard {
    fn check(self, store: &UserStore, mut ctx: GuardContext) -> ApiResult<GuardContext> {
        match self {
            Guard::ResolveUserByUsername => {
                // An absent header is an identity claim no user can match.
                let username = ctx.username.as_deref().ok_or(ApiError::UserNotFound)?;
                let user = store
                    .find_by_username(username)
                    .ok_or(ApiError::UserNotFound)?;

                ctx.user_id = Some(user.id);
                Ok(ctx)
            }
            Guard::CheckTodoQuota => {
                let user = store
                    .find_by_id(ctx.resolved_user()?)
                    .ok_or(ApiError::UserNotFound)?;

                // Pro bypasses the count check entirely; a pro user already
                // holding ten or more todos may keep creating.
                if user.pro {
                    return Ok(ctx);
                }

                if user.todos.len() >= FREE_PLAN_TODO_LIMIT {
                    return Err(ApiError::QuotaExceeded);
                }

                Ok(ctx)
            }
            Guard::ResolveTodoById => {
                // UUID syntax is checked before any lookup.
                let raw = ctx.path_id.as_deref().ok_or(ApiError::InvalidTodoId)?;
                let todo_id = Uuid::parse_str(raw).map_err(|_| ApiError::InvalidTodoId)?;

                let username = ctx.username.as_deref().ok_or(ApiError::UserNotFound)?;
                let user = store
                    .find_by_username(username)
                    .ok_or(ApiError::UserNotFound)?;

                let todo = user
                    .todos
                    .iter()
                    .find(|todo| todo.id == todo_id)
                    .ok_or(ApiError::TodoNotFound)?;

                ctx.user_id = Some(user.id);
                ctx.todo_id = Some(todo.id);
                Ok(ctx)
            }
            Guard::ResolveUserByPathId => {
                // User routes treat a malformed id as an id no user owns.
                let raw = ctx.path_id.as_deref().ok_or(ApiError::UserNotFound)?;
                let user_id = Uuid::parse_str(raw).map_err(|_| ApiError::UserNotFound)?;

                let user = store.find_by_id(user_id).ok_or(ApiError::UserNotFound)?;

                ctx.user_id = Some(user.id);
                Ok(ctx)
            }
        }
    }
}

/// Run `guards` in order against `ctx`; first failure wins
pub fn run_guards(
    store: &UserStore,
    guards: &[Guard],
    mut ctx: GuardContext,
) -> ApiResult<GuardContext> {
    for guard in guards {
        ctx = guard.check(store, ctx)?;
    }

    Ok(ctx)
}
