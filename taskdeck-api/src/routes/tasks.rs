/// Task endpoints
///
/// CRUD plus completion for the caller's own tasks. Every operation
/// takes the authenticated caller from the request's `AuthContext` and
/// passes it down to the owner-scoped model queries, so a task id
/// belonging to another user is indistinguishable from a missing one
/// (404 in both cases).
///
/// # Endpoints
///
/// - `GET    /v1/tasks` - List with optional `search`, `status`, and
///   `mark_completed` query parameters
/// - `POST   /v1/tasks` - Create
/// - `GET    /v1/tasks/:id` - Read
/// - `PUT    /v1/tasks/:id` - Edit (partial)
/// - `DELETE /v1/tasks/:id` - Delete
/// - `POST   /v1/tasks/:id/complete` - Mark completed
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::models::task::{CreateTask, Task, TaskFilter, TaskStatus, UpdateTask};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Query parameters for the list endpoint
///
/// All parameters are optional; empty strings are treated as absent,
/// matching what HTML form submissions send for untouched fields.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// Case-insensitive substring matched against title or description
    pub search: Option<String>,

    /// Status filter ("pending", "in_progress", or "completed")
    pub status: Option<String>,

    /// Task id to mark completed before the list is computed
    pub mark_completed: Option<String>,
}

/// Create task request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(
        length(min = 1, max = 100, message = "Title must be 1-100 characters"),
        custom(function = validate_not_blank)
    )]
    pub title: String,

    /// Task description
    #[validate(
        length(min = 1, message = "Description is required"),
        custom(function = validate_not_blank)
    )]
    pub description: String,

    /// Due date (YYYY-MM-DD)
    pub due_date: NaiveDate,

    /// Initial status (defaults to pending)
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// Update task request
///
/// All fields optional; only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(
        length(min = 1, max = 100, message = "Title must be 1-100 characters"),
        custom(function = validate_not_blank)
    )]
    pub title: Option<String>,

    /// New description
    #[validate(
        length(min = 1, message = "Description is required"),
        custom(function = validate_not_blank)
    )]
    pub description: Option<String>,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Task response body
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Due date
    pub due_date: NaiveDate,

    /// Current status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            status: task.status,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Task list response body
#[derive(Debug, Clone, Serialize)]
pub struct TaskListResponse {
    /// The caller's tasks, newest first
    pub tasks: Vec<TaskResponse>,
}

/// Rejects values that are only whitespace
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("not_blank");
        err.message = Some("Must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Parses an optional status query parameter
///
/// Empty strings mean "no filter"; anything else must be one of the
/// three status values.
fn parse_status_param(raw: Option<&str>) -> Result<Option<TaskStatus>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<TaskStatus>()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

/// List tasks endpoint handler
///
/// Returns the caller's tasks, filtered by the optional `search` and
/// `status` parameters (AND-combined). If `mark_completed` carries a
/// task id, that task is set to completed (owner-checked) before the
/// list is computed; a missing or non-owned id is a 404 and nothing is
/// listed.
///
/// An empty list is a normal 200 response.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    // Complete-from-the-list-view side effect, before filtering
    if let Some(raw) = query.mark_completed.as_deref().filter(|s| !s.is_empty()) {
        let task_id = raw
            .parse::<Uuid>()
            .map_err(|_| ApiError::BadRequest("Invalid task id".to_string()))?;

        Task::mark_completed(&state.db, task_id, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

        tracing::info!(user_id = %auth.user_id, task_id = %task_id, "Task marked completed from list");
    }

    let filter = TaskFilter {
        search: query.search.filter(|s| !s.is_empty()),
        status: parse_status_param(query.status.as_deref())?,
    };

    tracing::debug!(
        user_id = %auth.user_id,
        search = ?filter.search,
        status = ?filter.status,
        "Listing tasks"
    );

    let tasks = Task::list_by_owner(&state.db, auth.user_id, &filter).await?;

    Ok(Json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
    }))
}

/// Create task endpoint handler
///
/// # Errors
///
/// - 422 Unprocessable Entity: Validation errors (nothing is persisted)
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    request.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            status: request.status.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Get task endpoint handler
///
/// # Errors
///
/// - 404 Not Found: No such id, or the task belongs to another user
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_by_id_and_owner(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task.into()))
}

/// Update task endpoint handler
///
/// Applies the provided subset of fields.
///
/// # Errors
///
/// - 404 Not Found: No such id, or the task belongs to another user
/// - 422 Unprocessable Entity: Validation errors
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    request.validate()?;

    let task = Task::update(
        &state.db,
        task_id,
        auth.user_id,
        UpdateTask {
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            status: request.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task updated");

    Ok(Json(task.into()))
}

/// Delete task endpoint handler
///
/// # Errors
///
/// - 404 Not Found: No such id, or the task belongs to another user
///   (never a silent success)
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Task::delete(&state.db, task_id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, task_id = %task_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Mark completed endpoint handler
///
/// Any prior status transitions to completed; calling this on an
/// already-completed task succeeds again with no change.
///
/// # Errors
///
/// - 404 Not Found: No such id, or the task belongs to another user
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::mark_completed(&state.db, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task completed");

    Ok(Json(task.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: None,
        }
    }

    #[test]
    fn test_create_task_request_valid() {
        assert!(base_request().validate().is_ok());
    }

    #[test]
    fn test_create_task_request_empty_title() {
        let request = CreateTaskRequest {
            title: "".to_string(),
            ..base_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_task_request_blank_title() {
        let request = CreateTaskRequest {
            title: "   ".to_string(),
            ..base_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_task_request_title_too_long() {
        let request = CreateTaskRequest {
            title: "a".repeat(101),
            ..base_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_task_request_empty_description() {
        let request = CreateTaskRequest {
            description: "".to_string(),
            ..base_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_task_request_partial() {
        // No fields at all is a valid (no-op) update
        assert!(UpdateTaskRequest::default().validate().is_ok());

        let just_status = UpdateTaskRequest {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        };
        assert!(just_status.validate().is_ok());

        let blank_title = UpdateTaskRequest {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn test_parse_status_param() {
        assert_eq!(parse_status_param(None).unwrap(), None);
        assert_eq!(parse_status_param(Some("")).unwrap(), None);
        assert_eq!(
            parse_status_param(Some("pending")).unwrap(),
            Some(TaskStatus::Pending)
        );
        assert_eq!(
            parse_status_param(Some("in_progress")).unwrap(),
            Some(TaskStatus::InProgress)
        );
        assert!(parse_status_param(Some("done")).is_err());
    }

    #[test]
    fn test_task_response_serialization() {
        let response = TaskResponse {
            id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            title: "Buy milk".to_string(),
            description: "2%".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
        assert!(json.contains("\"due_date\":\"2024-01-10\""));
        // The owner is implicit in the authenticated request
        assert!(!json.contains("owner_id"));
    }

    #[test]
    fn test_create_request_status_defaults_to_pending() {
        let request: CreateTaskRequest = serde_json::from_str(
            r#"{"title": "t", "description": "d", "due_date": "2024-01-10"}"#,
        )
        .unwrap();
        assert_eq!(request.status.unwrap_or_default(), TaskStatus::Pending);
    }
}
