use crate::employee::{require, validate_email};
use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ログイン時にキャッシュされるユーザー情報
///
/// 表示用のキャッシュであり、ロールや本人性の正はサーバー側にある。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

/// 認証済みプリンシパルの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    Employee,
    Administrator,
}

impl Principal {
    /// ログイン結果からプリンシパルを決定
    ///
    /// サーバーが返したロールがあればそれを優先し、無ければ入力されたメールアドレスを
    /// 管理者用の識別子と比較する。
    pub fn infer(submitted_email: &str, user: Option<&UserInfo>, admin_email: &str) -> Self {
        if let Some(role) = user.and_then(|u| u.role.as_deref()) {
            return Self::from_role(role);
        }
        if normalize_email(submitted_email) == normalize_email(admin_email) {
            Principal::Administrator
        } else {
            Principal::Employee
        }
    }

    pub fn from_role(role: &str) -> Self {
        match role.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Principal::Administrator,
            _ => Principal::Employee,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Principal::Employee => "employee",
            Principal::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// プロフィール更新リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        validate_email(&self.email)
    }

    /// キャッシュ済みユーザー情報へ更新内容を反映
    pub fn apply_to(&self, user: &mut UserInfo) {
        user.name = self.name.clone();
        user.email = self.email.clone();
        user.department = Some(self.department.clone());
        if self.photo.is_some() {
            user.photo = self.photo.clone();
        }
    }
}

/// 従業員ダッシュボードの概要
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserDashboard {
    #[serde(alias = "total_tasks")]
    pub total_tasks: u32,
    #[serde(alias = "completed_tasks")]
    pub completed_tasks: u32,
    #[serde(alias = "in_progress_tasks")]
    pub in_progress_tasks: u32,
    #[serde(alias = "pending_tasks")]
    pub pending_tasks: u32,
    #[serde(alias = "overdue_tasks")]
    pub overdue_tasks: u32,
}
