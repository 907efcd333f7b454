use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Html,
    routing::get,
};
use chrono::Local;
use serde::Deserialize;
use std::sync::Arc;

use crate::task::{Task, TaskService, TaskServiceError};

#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    description: String,
}

#[derive(Debug, Deserialize)]
pub struct EditTaskForm {
    description: String,
}

/// Helper function to get all tasks and render them as a tasks table.
/// The service already returns tasks newest first, so handlers share this
/// without reimplementing the ordering policy.
#[tracing::instrument(skip(task_service))]
async fn render_tasks_table(task_service: &TaskService<'_>) -> Result<String, TaskError> {
    let tasks = task_service.list().await?;
    let table_template = TasksTableTemplate::new(tasks);
    table_template.render().map_err(TaskError::from)
}

/// Custom error type for task handler operations.
#[derive(Debug, thiserror::Error)]
enum TaskError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents a task service error.
    #[error("Task service error")]
    Service(#[from] TaskServiceError),
}

impl axum::response::IntoResponse for TaskError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, user_facing_error_message) = match &self {
            TaskError::Service(TaskServiceError::TaskNotFound(_)) => (
                StatusCode::NOT_FOUND,
                "That task no longer exists. Refresh the list and try again.",
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred while processing your request. Please try again later.",
            ),
        };

        let error_template = ErrorMessageTemplate::new(user_facing_error_message.to_string());
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let mut response = (status_code, Html(rendered)).into_response();
        // Add HTMX headers to retarget the error message to the error div
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#error-message"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("innerHTML"),
        );
        response.headers_mut().extend(headers);
        response
    }
}

#[derive(Template)]
#[template(path = "tasks.html")]
struct TasksTemplate {}

impl TasksTemplate {
    pub fn new() -> Self {
        Self {}
    }
}

#[derive(Template)]
#[template(path = "tasks/add_task_form.html")]
struct AddTaskFormTemplate;

#[derive(Template)]
#[template(path = "tasks/tasks_table.html")]
struct TasksTableTemplate {
    tasks: Vec<Task>,
}

impl TasksTableTemplate {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

#[derive(Template)]
#[template(path = "tasks/edit_task_form.html")]
struct EditTaskFormTemplate {
    task: Task,
}

impl EditTaskFormTemplate {
    pub fn new(task: Task) -> Self {
        Self { task }
    }
}

#[derive(Template)]
#[template(path = "tasks/error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// Handler for the / endpoint that displays the to-do page.
#[tracing::instrument]
async fn tasks_handler() -> Result<Html<String>, TaskError> {
    let template = TasksTemplate::new();
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for GET /tasks/table that returns just the tasks table fragment.
#[tracing::instrument(skip(state))]
async fn tasks_table_handler(State(state): State<TaskState>) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);
    let table_html = render_tasks_table(&task_service).await?;
    Ok(Html(table_html))
}

/// Handler for creating a new task via POST request.
///
/// An empty or whitespace-only description is rejected by the service; the
/// current table is re-rendered unchanged in that case.
#[tracing::instrument(skip(state))]
async fn create_task_handler(
    State(state): State<TaskState>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);

    // The presentation layer supplies the clock used for stamping.
    task_service.add(&form.description, Local::now()).await?;

    let table_html = render_tasks_table(&task_service).await?;
    Ok(Html(table_html))
}

/// Handler for serving the add task form.
#[tracing::instrument]
async fn add_task_form_handler() -> Result<Html<String>, TaskError> {
    let template = AddTaskFormTemplate;
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for serving the edit task form for one task.
#[tracing::instrument(skip(state))]
async fn edit_task_form_handler(
    State(state): State<TaskState>,
    axum::extract::Path(id): axum::extract::Path<u32>,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);

    let task = task_service.get_task_by_id(id).await?;
    let template = EditTaskFormTemplate::new(task);
    template.render().map(Html).map_err(TaskError::from)
}

/// Handler for renaming a task via PUT request.
#[tracing::instrument(skip(state))]
async fn update_task_handler(
    State(state): State<TaskState>,
    axum::extract::Path(id): axum::extract::Path<u32>,
    Form(form): Form<EditTaskForm>,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);

    task_service.rename(id, &form.description).await?;

    let table_html = render_tasks_table(&task_service).await?;
    Ok(Html(table_html))
}

/// Handler for removing a task via DELETE request.
#[tracing::instrument(skip(state))]
async fn delete_task_handler(
    State(state): State<TaskState>,
    axum::extract::Path(id): axum::extract::Path<u32>,
) -> Result<Html<String>, TaskError> {
    let task_service = TaskService::new(&state.db);

    task_service.remove(id).await?;

    let table_html = render_tasks_table(&task_service).await?;
    Ok(Html(table_html))
}

/// Creates and returns the task router with all task-related routes.
pub fn create_task_router(state: TaskState) -> Router {
    Router::new()
        .route("/", get(tasks_handler))
        .route("/tasks", axum::routing::post(create_task_handler))
        .route("/tasks/table", get(tasks_table_handler))
        .route("/tasks/form", get(add_task_form_handler))
        .route("/tasks/{id}/edit", get(edit_task_form_handler))
        .route(
            "/tasks/{id}",
            axum::routing::put(update_task_handler).delete(delete_task_handler),
        )
        .with_state(state)
}
