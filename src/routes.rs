//! To-do API routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{
    error::ApiError,
    guards::{Guard, GuardContext, run_guards},
    models::{CreateUserRequest, TodoPayload},
    state::AppState,
};

/// Create the router for the to-do API
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/pro", patch(upgrade_user))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route("/todos/:id/done", patch(mark_todo_done))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}

/// Permissive CORS, all routes
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Identity claim carried by the `username` header
fn username_claim(headers: &HeaderMap) -> Option<String> {
    headers
        .get("username")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "todo-api"
    }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    let user = store.create_user(&payload.name, &payload.username)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveUserByPathId],
        GuardContext::new().with_path_id(id),
    )?;
    let user = store
        .find_by_id(ctx.resolved_user()?)
        .ok_or(ApiError::UserNotFound)?;

    Ok(Json(user.clone()))
}

/// Upgrade a user to the pro plan
pub async fn upgrade_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveUserByPathId],
        GuardContext::new().with_path_id(id),
    )?;
    let user = store.upgrade_to_pro(ctx.resolved_user()?)?;

    Ok(Json(user))
}

/// List the claimed user's todos
pub async fn list_todos(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveUserByUsername],
        GuardContext::new().with_claim(username_claim(&headers)),
    )?;
    let todos = store.list_todos(ctx.resolved_user()?)?;

    Ok(Json(todos))
}

/// Create a todo for the claimed user
pub async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TodoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveUserByUsername, Guard::CheckTodoQuota],
        GuardContext::new().with_claim(username_claim(&headers)),
    )?;
    let todo = store.create_todo(ctx.resolved_user()?, &payload.title, payload.deadline)?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// Overwrite a todo's title and deadline
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<TodoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveTodoById],
        GuardContext::new()
            .with_claim(username_claim(&headers))
            .with_path_id(id),
    )?;
    let todo = store.update_todo(
        ctx.resolved_user()?,
        ctx.resolved_todo()?,
        &payload.title,
        payload.deadline,
    )?;

    Ok(Json(todo))
}

/// Mark a todo as done
pub async fn mark_todo_done(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    let ctx = run_guards(
        &store,
        &[Guard::ResolveTodoById],
        GuardContext::new()
            .with_claim(username_claim(&headers))
            .with_path_id(id),
    )?;
    let todo = store.mark_done(ctx.resolved_user()?, ctx.resolved_todo()?)?;

    Ok(Json(todo))
}

/// Delete a todo
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.lock().await;

    // The account check runs before the id-bearing todo resolution, so an
    // unknown username answers 404 even when the path id is malformed.
    let ctx = run_guards(
        &store,
        &[Guard::ResolveUserByUsername, Guard::ResolveTodoById],
        GuardContext::new()
            .with_claim(username_claim(&headers))
            .with_path_id(id),
    )?;
    store.delete_todo(ctx.resolved_user()?, ctx.resolved_todo()?)?;

    Ok(StatusCode::NO_CONTENT)
}
