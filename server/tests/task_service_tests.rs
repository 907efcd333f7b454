use chrono::Local;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use tasks_server::entities::task;
use tasks_server::task::{CREATED_AT_FORMAT, TaskService, TaskServiceError};

mod common;

async fn setup() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    common::setup_db().await
}

/// Inserts a task row directly through the entity, bypassing the service.
async fn insert_task(db: &DatabaseConnection, description: &str, created_at: &str) -> task::Model {
    let active_model = task::ActiveModel {
        description: ActiveValue::Set(description.to_string()),
        created_at: ActiveValue::Set(created_at.to_string()),
        ..Default::default()
    };
    active_model
        .insert(db)
        .await
        .expect("Failed to insert task")
}

#[tokio::test]
async fn can_add_and_list_round_trip() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let created = task_service
        .add("Buy milk", Local::now())
        .await
        .expect("Failed to add task")
        .expect("Task should not be rejected");
    assert_eq!(created.description(), "Buy milk");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description(), "Buy milk");
    assert!(
        chrono::NaiveDateTime::parse_from_str(tasks[0].created_at(), CREATED_AT_FORMAT).is_ok(),
        "created_at '{}' does not match the canonical format",
        tasks[0].created_at()
    );
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn rejects_empty_and_whitespace_descriptions() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let rejected = task_service
        .add("", Local::now())
        .await
        .expect("Add should not fail");
    assert!(rejected.is_none());

    let rejected = task_service
        .add("   ", Local::now())
        .await
        .expect("Add should not fail");
    assert!(rejected.is_none());

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert!(tasks.is_empty(), "Rejected adds must not create records");
}

#[tokio::test]
async fn trims_surrounding_whitespace_on_add() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let created = task_service
        .add("  Buy milk  ", Local::now())
        .await
        .expect("Failed to add task")
        .expect("Task should not be rejected");
    assert_eq!(created.description(), "Buy milk");
}

#[tokio::test]
async fn lists_tasks_newest_first() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    task_service
        .add("First task", Local::now())
        .await
        .expect("Failed to add first task");
    task_service
        .add("Second task", Local::now())
        .await
        .expect("Failed to add second task");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description(), "Second task");
    assert_eq!(tasks[1].description(), "First task");
}

#[tokio::test]
async fn can_rename_task_preserving_timestamp() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let inserted = insert_task(&db, "Buy milk", "Aug 25, 2026  14:03").await;

    let renamed = task_service
        .rename(inserted.id as u32, "Buy oat milk")
        .await
        .expect("Failed to rename task");
    assert_eq!(renamed.id(), inserted.id as u32);
    assert_eq!(renamed.description(), "Buy oat milk");
    assert_eq!(renamed.created_at(), "Aug 25, 2026  14:03");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description(), "Buy oat milk");
    assert_eq!(tasks[0].created_at(), "Aug 25, 2026  14:03");
}

#[tokio::test]
async fn can_handle_rename_when_task_not_found() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let inserted = insert_task(&db, "Buy milk", "Aug 25, 2026  14:03").await;

    let non_existent_id = (inserted.id + 1) as u32;
    let result = task_service.rename(non_existent_id, "Buy oat milk").await;
    assert!(matches!(
        result,
        Err(TaskServiceError::TaskNotFound(id)) if id == non_existent_id
    ));
    if let Err(e) = result {
        assert_eq!(
            e.to_string(),
            format!("Task with ID {} not found", non_existent_id)
        );
    }
}

#[tokio::test]
async fn can_remove_task() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let first = insert_task(&db, "Task A", "Aug 25, 2026  14:03").await;
    insert_task(&db, "Task B", "Aug 25, 2026  14:04").await;

    task_service
        .remove(first.id as u32)
        .await
        .expect("Failed to remove task");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description(), "Task B");
    assert_eq!(tasks[0].created_at(), "Aug 25, 2026  14:04");
}

#[tokio::test]
async fn removing_missing_task_is_a_noop() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    insert_task(&db, "Task A", "Aug 25, 2026  14:03").await;

    task_service
        .remove(9999)
        .await
        .expect("Removing a missing task should not fail");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description(), "Task A");
}

#[tokio::test]
async fn can_get_task_by_id() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let inserted = insert_task(&db, "Buy milk", "Aug 25, 2026  14:03").await;

    let task = task_service
        .get_task_by_id(inserted.id as u32)
        .await
        .expect("Failed to get task");
    assert_eq!(task.description(), "Buy milk");
    assert_eq!(task.created_at(), "Aug 25, 2026  14:03");
}

#[tokio::test]
async fn duplicate_descriptions_are_independently_addressable() {
    let db = setup().await.expect("Failed to setup test database");
    let task_service = TaskService::new(&db);

    let first = insert_task(&db, "Buy milk", "Aug 25, 2026  14:03").await;
    let second = insert_task(&db, "Buy milk", "Aug 25, 2026  14:04").await;
    assert_ne!(first.id, second.id);

    task_service
        .remove(first.id as u32)
        .await
        .expect("Failed to remove task");

    let tasks = task_service.list().await.expect("Failed to list tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id(), second.id as u32);
}
