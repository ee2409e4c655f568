use domain::{DomainError, Principal};
use infrastructure::ForcedLogoutListener;
use serde::Serialize;
use std::fmt;
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Employee,
    Administrator,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Employee => "employee",
            SessionState::Administrator => "administrator",
        }
    }

    pub fn principal(&self) -> Option<Principal> {
        match self {
            SessionState::Unauthenticated => None,
            SessionState::Employee => Some(Principal::Employee),
            SessionState::Administrator => Some(Principal::Administrator),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

impl From<Principal> for SessionState {
    fn from(principal: Principal) -> Self {
        match principal {
            Principal::Employee => SessionState::Employee,
            Principal::Administrator => SessionState::Administrator,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画面のエントリールート
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Home,
    MyTasks,
    Profile,
    Team,
    AdminDashboard,
    AdminEmployees,
    AdminTasks,
    AdminProgress,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Login,
        Route::Home,
        Route::MyTasks,
        Route::Profile,
        Route::Team,
        Route::AdminDashboard,
        Route::AdminEmployees,
        Route::AdminTasks,
        Route::AdminProgress,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/home",
            Route::MyTasks => "/tasks",
            Route::Profile => "/profile",
            Route::Team => "/team",
            Route::AdminDashboard => "/admin/dashboard",
            Route::AdminEmployees => "/admin/employees",
            Route::AdminTasks => "/admin/tasks",
            Route::AdminProgress => "/admin/progress",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim().trim_end_matches('/');
        let path = if path.is_empty() { "/login" } else { path };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// 管理者専用のルート。チーム一覧も `/admin/*` のデータで構成されるため含む
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Route::Team
                | Route::AdminDashboard
                | Route::AdminEmployees
                | Route::AdminTasks
                | Route::AdminProgress
        )
    }

    /// ログイン直後の遷移先
    pub fn landing(principal: Principal) -> Route {
        match principal {
            Principal::Employee => Route::Home,
            Principal::Administrator => Route::AdminDashboard,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// ロールルーター
///
/// `Unauthenticated → Employee | Administrator`（ログイン）と
/// `Employee | Administrator → Unauthenticated`（ログアウト・強制ログアウト）の
/// 遷移のみを許可する。セッション中のロール変更は存在しない。
#[derive(Debug, Default)]
pub struct RoleRouter {
    state: RwLock<SessionState>,
}

impl RoleRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state().principal()
    }

    /// ログイン成功による遷移。遷移先の初期ルートを返す
    pub fn sign_in(&self, principal: Principal) -> Result<Route, DomainError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let target = SessionState::from(principal);

        if *state != SessionState::Unauthenticated {
            warn!(from = %*state, to = %target, "不正なセッション遷移です");
            return Err(DomainError::InvalidTransition {
                from: state.to_string(),
                to: target.to_string(),
            });
        }

        *state = target;
        info!(role = %target, "サインインしました");
        Ok(Route::landing(principal))
    }

    /// 未認証状態へ戻す。既に未認証なら何もしない
    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != SessionState::Unauthenticated {
            info!(from = %*state, "サインアウトしました");
            *state = SessionState::Unauthenticated;
        }
    }

    /// 要求されたルートを現在の状態で表示できるルートに解決する
    pub fn resolve(&self, requested: Route) -> Route {
        match self.principal() {
            None => Route::Login,
            Some(principal) if requested == Route::Login => Route::landing(principal),
            Some(Principal::Employee) if requested.requires_admin() => Route::Home,
            Some(_) => requested,
        }
    }
}

impl ForcedLogoutListener for RoleRouter {
    fn on_forced_logout(&self) {
        warn!("認可切れによりログイン画面へ戻ります");
        self.sign_out();
    }
}
