use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 従業員ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl EmployeeId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 従業員（管理者のみが操作する）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
}

/// 従業員作成リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub department: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl NewEmployee {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("department", &self.department)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        validate_email(&self.email)
    }
}

/// 従業員更新リクエスト（氏名・部署・写真のみ）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeUpdate {
    pub name: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl EmployeeUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("department", &self.department)
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}
