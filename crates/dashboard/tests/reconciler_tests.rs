mod support;

use dashboard::SessionState;
use domain::{DomainError, Progress, TaskId, TaskStatus};
use shared::{ClientError, Surface};
use support::*;

async fn employee_harness() -> Harness {
    let h = Harness::new();
    h.login(EMPLOYEE_EMAIL, EMPLOYEE_PASSWORD, false).await;
    h
}

#[tokio::test]
async fn test_refresh_derives_statistics() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();

    let tasks = reconciler.refresh().await.unwrap();
    let stats = reconciler.statistics();

    assert_eq!(tasks.len(), 3);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.overall_progress, 33);
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::clamped(40)));
    assert_eq!(reconciler.committed(TaskId(9)), Some(Progress::COMPLETE));
}

#[tokio::test]
async fn test_dragging_is_local_and_clamped() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    let before = h.backend.request_count();

    for value in [45, 60, 80, 250] {
        reconciler.set_draft(TaskId(7), value).unwrap();
    }
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::COMPLETE));
    assert_eq!(reconciler.set_draft(TaskId(7), -3).unwrap(), Progress::ZERO);
    assert_eq!(reconciler.committed(TaskId(7)), Some(Progress::clamped(40)));
    assert_eq!(h.backend.request_count(), before);

    let unknown = reconciler.set_draft(TaskId(404), 10);
    assert!(matches!(unknown, Err(ClientError::Domain(_))));
}

#[tokio::test]
async fn test_commit_to_complete_refetches_status() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();

    let stats = reconciler.commit(TaskId(7), 100).await.unwrap();

    let task = reconciler
        .tasks()
        .into_iter()
        .find(|t| t.id == TaskId(7))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.progress_percentage, Progress::COMPLETE);
    assert_eq!(reconciler.committed(TaskId(7)), Some(Progress::COMPLETE));
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::COMPLETE));
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.overall_progress, 67);

    let last = h.backend.requests().pop().unwrap();
    assert_eq!(last.method.as_str(), "GET");
    assert!(last.url.ends_with("/user/tasks"));
}

#[tokio::test]
async fn test_failed_commit_rolls_back_draft() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    reconciler.set_draft(TaskId(8), 70).unwrap();
    let committed_before = reconciler.committed(TaskId(8));
    h.backend
        .fail_next("PUT", "/user/tasks/8", 500, "Database unavailable");

    let result = reconciler.commit(TaskId(8), 70).await;

    let error = result.unwrap_err();
    assert_eq!(error, ClientError::api(500, "Database unavailable"));
    assert_eq!(error.surface(), Surface::Banner);
    assert_eq!(reconciler.draft(TaskId(8)), committed_before);
    assert_eq!(reconciler.committed(TaskId(8)), committed_before);
    assert_eq!(h.backend.task(8).unwrap()["progress_percentage"], 0);
}

#[tokio::test]
async fn test_network_failure_rolls_back_draft() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    h.backend.set_offline(true);

    let result = reconciler.commit(TaskId(7), 90).await;

    assert!(matches!(result, Err(ClientError::Network(_))));
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::clamped(40)));
    assert_eq!(h.dashboard.router().state(), SessionState::Employee);
}

#[tokio::test]
async fn test_expired_token_forces_logout() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    h.backend.expire_tokens();

    let result = reconciler.commit(TaskId(7), 55).await;

    let error = result.unwrap_err();
    assert!(error.is_forced_logout());
    assert_eq!(h.dashboard.router().state(), SessionState::Unauthenticated);
    assert!(!h.dashboard.session().is_authenticated());
    assert!(h.session.is_empty());
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::clamped(40)));
}

#[tokio::test]
async fn test_user_dashboard_summary() {
    let h = employee_harness().await;

    let summary = h.dashboard.user_dashboard().await.unwrap();

    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.overdue_tasks, 0);
}

#[tokio::test]
async fn test_saved_progress_survives_failed_refetch() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    h.backend
        .fail_next("GET", "/user/tasks", 500, "Database unavailable");

    let stats = reconciler.commit(TaskId(7), 90).await.unwrap();

    assert_eq!(h.backend.task(7).unwrap()["progress_percentage"], 90);
    assert_eq!(reconciler.committed(TaskId(7)), Some(Progress::clamped(90)));
    assert_eq!(reconciler.draft(TaskId(7)), Some(Progress::clamped(90)));
    assert!(reconciler.is_stale());
    assert_eq!(stats, reconciler.statistics());
    assert_eq!(h.dashboard.router().state(), SessionState::Employee);

    reconciler.refresh().await.unwrap();
    assert!(!reconciler.is_stale());
    assert_eq!(reconciler.committed(TaskId(7)), Some(Progress::clamped(90)));
}

#[tokio::test]
async fn test_refresh_drops_drafts_of_removed_tasks() {
    let h = employee_harness().await;
    let reconciler = h.dashboard.reconciler();
    reconciler.refresh().await.unwrap();
    reconciler.set_draft(TaskId(8), 30).unwrap();

    h.backend.remove_task(8);
    reconciler.refresh().await.unwrap();

    assert_eq!(reconciler.draft(TaskId(8)), None);
    assert_eq!(reconciler.committed(TaskId(8)), None);
    assert_eq!(
        reconciler.set_draft(TaskId(8), 50).unwrap_err(),
        ClientError::Domain(DomainError::TaskNotFound("8".to_string()))
    );
    assert_eq!(reconciler.tasks().len(), 2);
}
