use crate::confirm::{Confirmation, DELETE_TASK_PROMPT};
use domain::{NewTask, Progress, Task, TaskId, TaskStatus, TaskStatusUpdate};
use infrastructure::AdminApi;
use shared::ClientError;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// タスクボードの列
#[derive(Debug, Clone, PartialEq)]
pub struct TaskColumn {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

/// 列の表示順
pub const BOARD_COLUMNS: [(TaskStatus, &str); 4] = [
    (TaskStatus::InProgress, "In progress"),
    (TaskStatus::Pending, "Pending"),
    (TaskStatus::Completed, "Completed"),
    (TaskStatus::Delayed, "Delayed"),
];

/// 管理者のタスクボード
///
/// 変更はサーバーに送信した後、手元の一覧に直接反映する。
pub struct AdminTaskBoard {
    api: AdminApi,
    tasks: Mutex<Vec<Task>>,
}

impl AdminTaskBoard {
    pub fn new(api: AdminApi) -> Self {
        Self {
            api,
            tasks: Mutex::new(Vec::new()),
        }
    }

    fn replace(&self, tasks: Vec<Task>) {
        *self.tasks.lock().unwrap_or_else(PoisonError::into_inner) = tasks;
    }

    pub async fn load(&self) -> Result<Vec<Task>, ClientError> {
        let tasks = self.api.tasks().await?;
        self.replace(tasks.clone());
        Ok(tasks)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// タスクを作成し、進捗0・指定した担当者で一覧に追加する
    pub async fn create(&self, new_task: &NewTask) -> Result<Task, ClientError> {
        new_task.validate()?;

        let mut task = self.api.create_task(new_task).await?;
        task.progress_percentage = Progress::ZERO;
        task.assigned_employee = Some(new_task.assigned_employee.clone());

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task.clone());
        info!(task_id = %task.id, "タスクを作成しました");
        Ok(task)
    }

    /// 状態と進捗のみを更新する
    pub async fn update(&self, id: TaskId, update: TaskStatusUpdate) -> Result<(), ClientError> {
        self.api.update_task(id, &update).await?;

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
            task.status = update.status;
            task.progress_percentage = update.progress_percentage;
        }
        info!(task_id = %id, status = %update.status, "タスクを更新しました");
        Ok(())
    }

    /// 確認が得られた場合のみ削除する。削除したかどうかを返す
    pub async fn delete(
        &self,
        id: TaskId,
        confirmation: &dyn Confirmation,
    ) -> Result<bool, ClientError> {
        if !confirmation.confirm(DELETE_TASK_PROMPT) {
            return Ok(false);
        }

        self.api.delete_task(id).await?;
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|task| task.id != id);
        info!(task_id = %id, "タスクを削除しました");
        Ok(true)
    }

    /// 状態ごとの列に振り分ける
    pub fn columns(&self) -> Vec<TaskColumn> {
        let tasks = self.tasks();
        BOARD_COLUMNS
            .iter()
            .map(|(status, title)| TaskColumn {
                status: *status,
                title,
                tasks: tasks
                    .iter()
                    .filter(|task| task.status == *status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }
}
