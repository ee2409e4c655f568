use crate::task::{deserialize_lenient_progress, DueDate, Progress, Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// 完了率を計算（総数0の場合は0）
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = 100.0 * completed as f64 / total as f64;
    ratio.round().clamp(0.0, 100.0) as u8
}

/// タスク一覧から導出される集計値
///
/// 取得のたびに正のタスク一覧から再計算され、単独ではキャッシュされない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TaskStatistics {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub delayed: usize,
    pub overall_progress: u8,
}

impl TaskStatistics {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = TaskStatistics {
            total: tasks.len(),
            ..Default::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Delayed => stats.delayed += 1,
            }
        }
        stats.overall_progress = completion_percentage(stats.completed, stats.total);
        stats
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Delayed => self.delayed,
        }
    }
}

/// 管理者ダッシュボードの状態別件数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBreakdown {
    pub completed: u32,
    pub in_progress: u32,
    pub overdue: u32,
}

/// `GET /admin/dashboard` の応答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_employees: u32,
    pub total_tasks: u32,
    pub task_statistics: StatusBreakdown,
}

impl AdminOverview {
    pub fn overall_progress(&self) -> u8 {
        completion_percentage(
            self.task_statistics.completed as usize,
            self.total_tasks as usize,
        )
    }
}

/// `GET /admin/progress` の1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub task_name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_progress")]
    pub progress_percentage: Progress,
    #[serde(default)]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub updated_at: Option<DueDate>,
    #[serde(default, alias = "employee")]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl ProgressRow {
    /// 表示用の日付（最終更新日、無ければ期限日）
    pub fn display_date(&self) -> Option<DueDate> {
        self.updated_at.or(self.due_date)
    }
}
