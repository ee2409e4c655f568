use crate::router::RoleRouter;
use domain::{Principal, UserInfo};
use infrastructure::{ApiGateway, AuthApi, CredentialStore, FALLBACK_ERROR_MESSAGE};
use shared::ClientError;
use std::sync::Arc;
use tracing::{info, warn};

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const LOGIN_REJECTED_MESSAGE: &str = "Login failed. Please check your credentials.";

/// 認証に成功したログインの結果
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub token: String,
    pub user: Option<UserInfo>,
}

/// セッションコントローラー
///
/// 認証のみを担当し、資格情報の保存方針（remember-me）には関与しない。
pub struct SessionController {
    auth: AuthApi,
    credentials: Arc<CredentialStore>,
    router: Arc<RoleRouter>,
    admin_email: String,
}

impl SessionController {
    pub fn new(
        gateway: Arc<ApiGateway>,
        router: Arc<RoleRouter>,
        admin_email: impl Into<String>,
    ) -> Self {
        Self {
            auth: AuthApi::new(gateway.clone()),
            credentials: gateway.credentials().clone(),
            router,
            admin_email: admin_email.into(),
        }
    }

    /// 資格情報をサーバーに送信する。保存は呼び出し側が行う
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, ClientError> {
        let response = match self.auth.login(email, password).await {
            Ok(response) => response,
            Err(ClientError::Api { status, message }) => {
                warn!(status, "ログインが拒否されました");
                let message = if message == FALLBACK_ERROR_MESSAGE {
                    LOGIN_FAILED_MESSAGE.to_string()
                } else {
                    message
                };
                return Err(ClientError::Auth(message));
            }
            Err(e) => return Err(e),
        };

        match response.token() {
            Some(token) if response.is_acknowledged() => {
                info!("ログインに成功しました");
                Ok(AuthenticatedSession {
                    token: token.to_string(),
                    user: response.user.clone(),
                })
            }
            _ => {
                warn!(message = ?response.message, "トークンを含まないログイン応答です");
                Err(ClientError::Auth(LOGIN_REJECTED_MESSAGE.to_string()))
            }
        }
    }

    /// 資格情報を破棄して未認証状態へ戻す。ネットワークには依存しない
    pub fn logout(&self) {
        self.credentials.clear();
        self.router.sign_out();
        info!("ログアウトしました");
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_present()
    }

    /// ログイン結果からプリンシパルを決定
    pub fn principal_for(&self, submitted_email: &str, user: Option<&UserInfo>) -> Principal {
        Principal::infer(submitted_email, user, &self.admin_email)
    }

    /// 起動時に保存済みの資格情報からセッションを復元する
    ///
    /// トークンとユーザー情報の両方が揃っている場合のみ復元し、
    /// 復元したプリンシパルを返す。
    pub fn restore(&self) -> Option<Principal> {
        if let Some(principal) = self.router.principal() {
            return Some(principal);
        }
        if !self.credentials.is_present() {
            return None;
        }
        let user = self.credentials.user_info()?;
        let principal = self.principal_for(&user.email, Some(&user));

        match self.router.sign_in(principal) {
            Ok(_) => {
                info!(role = %principal, "保存済みのセッションを復元しました");
                Some(principal)
            }
            Err(e) => {
                warn!(error = %e, "セッションを復元できません");
                None
            }
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn router(&self) -> &Arc<RoleRouter> {
        &self.router
    }
}
