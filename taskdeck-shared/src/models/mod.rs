/// Database models for TaskDeck
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `task`: To-do records owned by a single user
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::models::task::{Task, TaskFilter};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// let filter = TaskFilter {
///     search: Some("milk".to_string()),
///     status: None,
/// };
///
/// let tasks = Task::list_by_owner(&pool, owner_id, &filter).await?;
/// # Ok(())
/// # }
/// ```
pub mod task;
pub mod user;
