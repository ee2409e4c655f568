use domain::{DomainError, Progress, Task, TaskId, TaskStatistics};
use infrastructure::UserApi;
use shared::ClientError;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct ReconcilerState {
    tasks: Vec<Task>,
    committed: HashMap<TaskId, Progress>,
    drafts: HashMap<TaskId, Progress>,
    statistics: TaskStatistics,
    /// 書き込み後の再取得に失敗し、一覧と集計がサーバーと一致していない
    stale: bool,
}

impl ReconcilerState {
    /// サーバーから取得した一覧で全体を置き換え、下書きを確定値に戻す
    fn replace(&mut self, tasks: Vec<Task>) {
        self.committed = tasks
            .iter()
            .map(|task| (task.id, task.progress_percentage))
            .collect();
        self.drafts = self.committed.clone();
        self.statistics = TaskStatistics::from_tasks(&tasks);
        self.tasks = tasks;
        self.stale = false;
    }

    /// サーバーが受け付けた値を確定値として反映する
    fn confirm(&mut self, id: TaskId, progress: Progress) {
        self.committed.insert(id, progress);
        self.drafts.insert(id, progress);
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            task.progress_percentage = progress;
        }
    }
}

/// タスク進捗の調停
///
/// タスクごとに確定値（サーバーが確認した値）と下書き値（操作中の値）を保持する。
/// 確定に成功した場合は部分的なマージを行わず一覧全体を再取得し、
/// 集計値も再取得した一覧から計算し直す。
/// ロックは `.await` をまたいで保持しない。
pub struct TaskProgressReconciler {
    api: UserApi,
    state: Mutex<ReconcilerState>,
}

impl TaskProgressReconciler {
    pub fn new(api: UserApi) -> Self {
        Self {
            api,
            state: Mutex::new(ReconcilerState::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReconcilerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// タスク一覧を取得して状態を置き換える
    pub async fn refresh(&self) -> Result<Vec<Task>, ClientError> {
        let tasks = self.api.tasks().await?;
        let mut state = self.lock();
        state.replace(tasks.clone());
        debug!(
            total = state.statistics.total,
            overall = state.statistics.overall_progress,
            "タスク一覧を再取得しました"
        );
        Ok(tasks)
    }

    /// 下書き値を更新する（ネットワーク呼び出しなし）
    pub fn set_draft(&self, id: TaskId, value: i64) -> Result<Progress, ClientError> {
        let progress = Progress::clamped(value);
        let mut state = self.lock();
        if !state.committed.contains_key(&id) {
            return Err(DomainError::TaskNotFound(id.to_string()).into());
        }
        state.drafts.insert(id, progress);
        Ok(progress)
    }

    /// 値をサーバーに確定する
    ///
    /// 失敗した場合は下書き値を直前の確定値へ戻し、エラーを返す。
    /// 成功した場合は一覧全体を再取得する。再取得だけが失敗した場合は
    /// 書き込んだ値を確定値として保持し、`is_stale` を立てて直前の集計を返す。
    pub async fn commit(&self, id: TaskId, value: i64) -> Result<TaskStatistics, ClientError> {
        let progress = Progress::clamped(value);
        {
            let mut state = self.lock();
            if !state.committed.contains_key(&id) {
                return Err(DomainError::TaskNotFound(id.to_string()).into());
            }
            state.drafts.insert(id, progress);
        }

        if let Err(e) = self.api.update_progress(id, progress).await {
            let mut state = self.lock();
            if let Some(committed) = state.committed.get(&id).copied() {
                state.drafts.insert(id, committed);
            }
            warn!(task_id = %id, error = %e, "進捗の更新に失敗したため下書きを戻します");
            return Err(e);
        }

        info!(task_id = %id, progress = progress.value(), "進捗を更新しました");
        self.lock().confirm(id, progress);

        if let Err(e) = self.refresh().await {
            let mut state = self.lock();
            state.stale = true;
            warn!(task_id = %id, error = %e, "更新後の再取得に失敗しました");
            return Ok(state.statistics);
        }
        Ok(self.statistics())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn draft(&self, id: TaskId) -> Option<Progress> {
        self.lock().drafts.get(&id).copied()
    }

    pub fn committed(&self, id: TaskId) -> Option<Progress> {
        self.lock().committed.get(&id).copied()
    }

    pub fn statistics(&self) -> TaskStatistics {
        self.lock().statistics
    }

    /// 一覧と集計が最後の書き込みを反映していない可能性がある
    pub fn is_stale(&self) -> bool {
        self.lock().stale
    }
}
