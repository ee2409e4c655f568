use crate::admin_tasks::AdminTaskBoard;
use crate::employees::EmployeeDirectory;
use crate::login::LoginFlow;
use crate::overview::ProgressOverview;
use crate::profile::ProfileEditor;
use crate::reconciler::TaskProgressReconciler;
use crate::router::{RoleRouter, Route};
use crate::session::SessionController;
use crate::team::TeamOverview;
use domain::{DomainError, Principal, UserDashboard};
use infrastructure::{
    AdminApi, ApiGateway, CredentialStore, FileStore, HttpTransport, MemoryStore, UserApi,
};
use shared::{ClientError, Config};
use std::sync::Arc;
use tracing::info;

/// アプリケーション全体の組み立て
///
/// 資格情報ストア・ゲートウェイ・ルーター・セッションコントローラーを
/// 起動時に1度だけ生成し、各画面に注入する。
pub struct Dashboard {
    config: Config,
    gateway: Arc<ApiGateway>,
    router: Arc<RoleRouter>,
    session: Arc<SessionController>,
}

impl Dashboard {
    pub fn new(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        let gateway = ApiGateway::new(config.api_base_url.clone(), transport, credentials);
        Self::with_gateway(config, Arc::new(gateway))
    }

    /// 永続ストアをファイル、セッションストアをメモリに置き、reqwest で接続する
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let durable = FileStore::open(config.durable_store_path())?;
        let credentials = Arc::new(CredentialStore::new(
            Arc::new(durable),
            Arc::new(MemoryStore::new()),
            config.remember_policy,
        ));

        info!(
            api_base_url = %config.api_base_url,
            environment = %config.environment,
            "ダッシュボードを初期化しました"
        );
        let gateway = Arc::new(ApiGateway::from_config(&config, credentials));
        Ok(Self::with_gateway(config, gateway))
    }

    /// ルーターを強制ログアウトの通知先に登録し、セッションコントローラーを組み立てる
    fn with_gateway(config: Config, gateway: Arc<ApiGateway>) -> Self {
        let router = Arc::new(RoleRouter::new());
        gateway.on_forced_logout(router.clone());

        let session = Arc::new(SessionController::new(
            gateway.clone(),
            router.clone(),
            config.admin_email.clone(),
        ));

        Self {
            config,
            gateway,
            router,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    pub fn router(&self) -> &Arc<RoleRouter> {
        &self.router
    }

    pub fn session(&self) -> &Arc<SessionController> {
        &self.session
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.gateway.credentials()
    }

    /// 保存済みのセッションを復元
    pub fn restore(&self) -> Option<Principal> {
        self.session.restore()
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn user_api(&self) -> UserApi {
        UserApi::new(self.gateway.clone())
    }

    pub fn admin_api(&self) -> AdminApi {
        AdminApi::new(self.gateway.clone())
    }

    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(self.session.clone())
    }

    pub fn reconciler(&self) -> TaskProgressReconciler {
        TaskProgressReconciler::new(self.user_api())
    }

    pub fn task_board(&self) -> AdminTaskBoard {
        AdminTaskBoard::new(self.admin_api())
    }

    pub fn employee_directory(&self) -> EmployeeDirectory {
        EmployeeDirectory::new(self.admin_api())
    }

    pub fn progress_overview(&self) -> ProgressOverview {
        ProgressOverview::new(self.admin_api())
    }

    pub fn profile_editor(&self) -> ProfileEditor {
        ProfileEditor::new(self.user_api(), self.credentials().clone())
    }

    /// チーム一覧を読み込む。管理者APIを使うため、ルートガードを通過できなければ送信しない
    pub async fn team_overview(&self) -> Result<TeamOverview, ClientError> {
        if self.router.resolve(Route::Team) != Route::Team {
            return Err(DomainError::AccessDenied(Route::Team.path().to_string()).into());
        }
        TeamOverview::load(&self.admin_api()).await
    }

    pub async fn user_dashboard(&self) -> Result<UserDashboard, ClientError> {
        self.user_api().dashboard().await
    }
}
