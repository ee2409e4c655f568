use domain::{Employee, Task, UserInfo};
use serde::{Deserialize, Serialize};

/// ログイン成功時にサーバーが返すメッセージ
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful.";

/// `POST /admin/login` のリクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /admin/login` の応答
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<UserInfo>,
}

impl LoginResponse {
    /// 空でないトークンを含む場合のみ返す
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.trim().is_empty())
    }

    /// 成功メッセージを伴うか（メッセージが無い応答は成功扱い）
    pub fn is_acknowledged(&self) -> bool {
        match self.message.as_deref() {
            Some(message) => message == LOGIN_SUCCESS_MESSAGE,
            None => true,
        }
    }
}

/// `POST /admin/employees` の応答
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmployeeEnvelope {
    #[serde(alias = "employee")]
    pub user: Employee,
}

/// `POST /admin/tasks` の応答
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskEnvelope {
    pub task: Task,
}
