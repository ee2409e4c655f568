use crate::errors::{DomainError, ValidationError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// タスクID（バックエンドが採番する整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| DomainError::TaskNotFound(s.to_string()))
    }
}

/// 進捗率（0〜100に常にクランプされる）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const COMPLETE: Progress = Progress(100);

    /// 任意の整数を[0,100]にクランプして作成
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    /// 浮動小数点値を四捨五入してクランプ（NaNは0として扱う）
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.round().clamp(0.0, 100.0) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for Progress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%');
        trimmed
            .parse::<f64>()
            .map(Self::from_f64)
            .map_err(|_| DomainError::InvalidProgress(s.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProgress {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawProgress {
    fn into_progress(self) -> Result<Progress, DomainError> {
        match self {
            RawProgress::Int(value) => Ok(Progress::clamped(value)),
            RawProgress::Float(value) => Ok(Progress::from_f64(value)),
            RawProgress::Text(text) => text.parse(),
        }
    }
}

// バックエンドは数値・数値文字列のどちらも返しうる
impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawProgress::deserialize(deserializer)?
            .into_progress()
            .map_err(serde::de::Error::custom)
    }
}

/// `null`または欠落した進捗を0として読み込む
pub fn deserialize_lenient_progress<'de, D>(deserializer: D) -> Result<Progress, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Progress>::deserialize(deserializer)?.unwrap_or_default())
}

/// タスクの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Delayed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Delayed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Delayed => "delayed",
        }
    }

    /// 画面表示用ラベル
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Delayed => "Delayed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "delayed" | "overdue" | "late" => Ok(TaskStatus::Delayed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// タスクの優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(DomainError::InvalidPriority(s.to_string())),
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 期限日
///
/// `YYYY-MM-DD`とRFC 3339タイムスタンプの両方を受け付け、`YYYY-MM-DD`で出力する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DueDate(NaiveDate);

impl DueDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.0 < today
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DueDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(timestamp.date_naive()));
        }
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self(timestamp.date()));
        }
        Err(DomainError::InvalidDueDate(s.to_string()))
    }
}

impl Serialize for DueDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DueDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// タスクの担当者（IDまたは氏名で返される）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    Id(i64),
    Name(String),
}

impl Assignee {
    /// フォーム入力から担当者を作成（数値ならIDとして扱う）
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.parse::<i64>() {
            Ok(id) => Assignee::Id(id),
            Err(_) => Assignee::Name(input.to_string()),
        }
    }

    /// 従業員IDまたは氏名が一致するか
    pub fn matches(&self, employee_id: i64, employee_name: &str) -> bool {
        match self {
            Assignee::Id(id) => *id == employee_id,
            Assignee::Name(name) => {
                name == employee_name || name.trim().parse::<i64>() == Ok(employee_id)
            }
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignee::Id(id) => write!(f, "#{id}"),
            Assignee::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default, deserialize_with = "deserialize_lenient_progress")]
    pub progress_percentage: Progress,
    #[serde(default)]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub assigned_employee: Option<Assignee>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// タスク作成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub task_name: String,
    pub description: String,
    pub assigned_employee: Assignee,
    pub due_date: DueDate,
    pub priority: Priority,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_name.trim().is_empty() {
            return Err(ValidationError::Required { field: "task_name" });
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "description",
            });
        }
        if let Assignee::Name(name) = &self.assigned_employee {
            if name.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "assigned_employee",
                });
            }
        }
        Ok(())
    }
}

/// 管理者によるタスク更新（状態と進捗のみ）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
    pub progress_percentage: Progress,
}

/// 従業員による進捗更新
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub progress: Progress,
}
