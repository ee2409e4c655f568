use domain::{AdminOverview, DueDate, ProgressRow};
use infrastructure::AdminApi;
use shared::ClientError;
use tracing::debug;

/// グラフのラベルに使うタスク名の最大文字数
pub const TASK_LABEL_MAX: usize = 20;

/// 最大文字数を超えるタスク名を切り詰めて `...` を付ける
pub fn format_task_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let truncated: String = name.chars().take(max).collect();
    format!("{truncated}...")
}

/// 日付を `YYYY-MM-DD` で表示（無ければ `-`）
pub fn format_date(date: Option<DueDate>) -> String {
    date.map(|date| date.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// 管理者向け進捗レポート
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    pub overview: AdminOverview,
    pub rows: Vec<ProgressRow>,
}

impl ProgressReport {
    pub fn overall_progress(&self) -> u8 {
        self.overview.overall_progress()
    }

    pub fn chart_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| format_task_name(&row.task_name, TASK_LABEL_MAX))
            .collect()
    }
}

/// 進捗概要画面
pub struct ProgressOverview {
    api: AdminApi,
}

impl ProgressOverview {
    pub fn new(api: AdminApi) -> Self {
        Self { api }
    }

    /// 集計と進捗一覧を並行して取得する
    pub async fn load(&self) -> Result<ProgressReport, ClientError> {
        let (overview, rows) = tokio::try_join!(self.api.dashboard(), self.api.progress())?;
        debug!(
            employees = overview.total_employees,
            tasks = overview.total_tasks,
            rows = rows.len(),
            "進捗概要を取得しました"
        );
        Ok(ProgressReport { overview, rows })
    }
}
