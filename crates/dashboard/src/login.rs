use crate::router::Route;
use crate::session::SessionController;
use domain::{DomainError, LoginForm, Principal};
use shared::ClientError;
use std::sync::Arc;
use tracing::{info, instrument};

/// ログイン画面の送信処理
///
/// 入力検証 → 認証 → 資格情報の保存 → ロール遷移 の順に実行する。
/// 入力検証に失敗した場合はネットワーク呼び出しを行わない。
pub struct LoginFlow {
    session: Arc<SessionController>,
}

impl LoginFlow {
    pub fn new(session: Arc<SessionController>) -> Self {
        Self { session }
    }

    #[instrument(skip_all, fields(remember_me = form.remember_me))]
    pub async fn submit(&self, form: &LoginForm) -> Result<Route, ClientError> {
        form.validate()?;

        let router = self.session.router();
        let current = router.state();
        if current.is_authenticated() {
            return Err(DomainError::InvalidTransition {
                from: current.to_string(),
                to: "login".to_string(),
            }
            .into());
        }

        let email = form.email.trim();
        let authenticated = self.session.login(email, &form.password).await?;

        let mut user = authenticated.user.unwrap_or_default();
        if user.email.trim().is_empty() {
            user.email = email.to_string();
        }
        let principal: Principal = self.session.principal_for(email, Some(&user));

        let credentials = self.session.credentials();
        credentials.save(&authenticated.token, form.remember_me)?;
        credentials.save_user_info(&user, form.remember_me)?;

        let route = router.sign_in(principal)?;
        info!(role = %principal, route = %route, "ログイン後の画面へ遷移します");
        Ok(route)
    }
}
