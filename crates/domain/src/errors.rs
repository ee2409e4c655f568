use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid task status: {0}")]
    InvalidStatus(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Invalid progress value: {0}")]
    InvalidProgress(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Employee not found: {0}")]
    EmployeeNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    // セッション状態遷移のエラー
    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

/// 入力フォームのバリデーションエラー
///
/// ネットワーク呼び出しの前にローカルで判定され、送信をブロックする。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}
