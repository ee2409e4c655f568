use domain::{DomainError, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// クライアント全体で使用されるエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    // ローカル検証エラー（ネットワークに到達しない）
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    // 認証エラー（ログイン画面にインライン表示）
    #[error("Authentication failed: {0}")]
    Auth(String),

    // 2xx以外の応答
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // 応答なし
    #[error("Network error: {0}")]
    Network(String),

    // 401応答。資格情報は既に破棄されている
    #[error("Authorization expired")]
    AuthorizationExpired,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// クライアント起因（入力・認証・4xx）
    Client,
    /// サーバー起因（5xx）
    Server,
    /// 一時的なエラー（呼び出し側の判断で再試行可能）
    Transient,
    /// 永続的なエラー
    Permanent,
}

/// エラーの重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

/// 画面への表出方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// フォーム内に表示
    Inline,
    /// アラート・バナーで表示
    Banner,
    /// 表示せず強制ログアウト
    ForcedLogout,
}

/// エラーメタデータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub surface: Surface,
    /// 呼び出し側が再試行を検討してよいか（自動再試行は行わない）
    pub retryable: bool,
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        ClientError::Api {
            status,
            message: message.into(),
        }
    }

    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        match self {
            ClientError::Validation(_) => ErrorMetadata {
                code: "VALIDATION_ERROR",
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Info,
                surface: Surface::Inline,
                retryable: false,
            },
            ClientError::Auth(_) => ErrorMetadata {
                code: "AUTHENTICATION_ERROR",
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
                surface: Surface::Inline,
                retryable: false,
            },
            ClientError::Api { status, .. } => {
                let server_side = *status >= 500;
                ErrorMetadata {
                    code: "API_ERROR",
                    category: if server_side {
                        ErrorCategory::Server
                    } else {
                        ErrorCategory::Client
                    },
                    severity: if server_side {
                        ErrorSeverity::Error
                    } else {
                        ErrorSeverity::Warning
                    },
                    surface: Surface::Banner,
                    retryable: server_side,
                }
            }
            ClientError::Network(_) => ErrorMetadata {
                code: "NETWORK_ERROR",
                category: ErrorCategory::Transient,
                severity: ErrorSeverity::Error,
                surface: Surface::Banner,
                retryable: true,
            },
            ClientError::AuthorizationExpired => ErrorMetadata {
                code: "AUTHORIZATION_EXPIRED",
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
                surface: Surface::ForcedLogout,
                retryable: false,
            },
            ClientError::Decode(_) => ErrorMetadata {
                code: "DECODE_ERROR",
                category: ErrorCategory::Permanent,
                severity: ErrorSeverity::Error,
                surface: Surface::Banner,
                retryable: false,
            },
            ClientError::Storage(_) => ErrorMetadata {
                code: "STORAGE_ERROR",
                category: ErrorCategory::Permanent,
                severity: ErrorSeverity::Error,
                surface: Surface::Banner,
                retryable: false,
            },
            ClientError::Domain(_) => ErrorMetadata {
                code: "DOMAIN_ERROR",
                category: ErrorCategory::Client,
                severity: ErrorSeverity::Warning,
                surface: Surface::Banner,
                retryable: false,
            },
            ClientError::Configuration(_) => ErrorMetadata {
                code: "CONFIGURATION_ERROR",
                category: ErrorCategory::Permanent,
                severity: ErrorSeverity::Error,
                surface: Surface::Banner,
                retryable: false,
            },
        }
    }

    pub fn surface(&self) -> Surface {
        self.metadata().surface
    }

    pub fn is_forced_logout(&self) -> bool {
        matches!(self, ClientError::AuthorizationExpired)
    }

    /// HTTPステータスコード（応答を受け取ったエラーのみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::AuthorizationExpired => Some(401),
            _ => None,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(error) => error.to_string(),
            ClientError::Auth(message) => message.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Network(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            ClientError::AuthorizationExpired => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ClientError::Decode(_) => "Unexpected response from the server.".to_string(),
            ClientError::Storage(_) => "Could not access local storage.".to_string(),
            ClientError::Domain(error) => error.to_string(),
            ClientError::Configuration(message) => message.clone(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_inline() {
        let error = ClientError::from(ValidationError::MissingFields);
        let metadata = error.metadata();

        assert_eq!(metadata.code, "VALIDATION_ERROR");
        assert_eq!(metadata.surface, Surface::Inline);
        assert_eq!(error.user_message(), "Please fill in all fields");
    }

    #[test]
    fn test_authorization_expired_forces_logout() {
        let error = ClientError::AuthorizationExpired;

        assert!(error.is_forced_logout());
        assert_eq!(error.surface(), Surface::ForcedLogout);
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn test_api_error_category_by_status() {
        let client_side = ClientError::api(404, "Task not found");
        assert_eq!(client_side.metadata().category, ErrorCategory::Client);
        assert!(!client_side.metadata().retryable);
        assert_eq!(client_side.user_message(), "Task not found");

        let server_side = ClientError::api(503, "Service unavailable");
        assert_eq!(server_side.metadata().category, ErrorCategory::Server);
        assert!(server_side.metadata().retryable);
        assert_eq!(server_side.surface(), Surface::Banner);
    }

    #[test]
    fn test_network_error_is_transient() {
        let error = ClientError::Network("connection refused".to_string());
        let metadata = error.metadata();

        assert_eq!(metadata.category, ErrorCategory::Transient);
        assert!(metadata.retryable);
        assert_eq!(error.status(), None);
    }
}
