use crate::storage::{KeyValueStore, MemoryStore};
use domain::UserInfo;
use shared::{ClientError, RememberPolicy};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// ベアラートークンのキー
pub const TOKEN_KEY: &str = "authToken";
/// キャッシュ済みユーザー情報のキー
pub const USER_KEY: &str = "user";

/// 資格情報ストア
///
/// 永続ストアとセッションストアの2つを束ねる。読み出しは常に永続ストアを先に参照し、
/// 次にセッションストアを参照する。ライフサイクルは
/// 起動時に生成 → ログインで保存 → ログアウトで破棄。
pub struct CredentialStore {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    policy: RememberPolicy,
}

impl CredentialStore {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        policy: RememberPolicy,
    ) -> Self {
        Self {
            durable,
            session,
            policy,
        }
    }

    /// 両方ともメモリ上に置くストア
    pub fn in_memory(policy: RememberPolicy) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            policy,
        )
    }

    pub fn policy(&self) -> RememberPolicy {
        self.policy
    }

    /// (書き込み先, 反対側) のストアを選択
    fn targets(&self, durable: bool) -> (&dyn KeyValueStore, &dyn KeyValueStore) {
        if durable {
            (self.durable.as_ref(), self.session.as_ref())
        } else {
            (self.session.as_ref(), self.durable.as_ref())
        }
    }

    /// トークンを保存し、反対側のストアに残る古いトークンを削除する
    pub fn save(&self, token: &str, remember_me: bool) -> Result<(), ClientError> {
        let durable = match self.policy {
            RememberPolicy::Consistent => remember_me,
            RememberPolicy::DurableToken => true,
        };
        let (target, other) = self.targets(durable);
        target.set(TOKEN_KEY, token)?;
        other.remove(TOKEN_KEY)?;

        debug!(durable, remember_me, "トークンを保存しました");
        Ok(())
    }

    /// ユーザー情報を保存（保存先は常に remember-me フラグで決まる）
    pub fn save_user_info(&self, user: &UserInfo, remember_me: bool) -> Result<(), ClientError> {
        let json = serde_json::to_string(user)?;
        let (target, other) = self.targets(remember_me);
        target.set(USER_KEY, &json)?;
        other.remove(USER_KEY)?;
        Ok(())
    }

    /// 現在ユーザー情報を保持しているストアを上書きする
    pub fn update_user_info(&self, user: &UserInfo) -> Result<(), ClientError> {
        let json = serde_json::to_string(user)?;
        let in_durable = matches!(self.durable.get(USER_KEY), Ok(Some(_)));
        let target = if in_durable {
            self.durable.as_ref()
        } else {
            self.session.as_ref()
        };
        target.set(USER_KEY, &json)?;
        Ok(())
    }

    /// トークンを取得（永続ストア → セッションストアの順）
    pub fn read(&self) -> Option<String> {
        self.lookup(TOKEN_KEY).filter(|token| !token.is_empty())
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        let raw = self.lookup(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "キャッシュ済みユーザー情報を読み込めません");
                None
            }
        }
    }

    /// 存在確認のみ。トークンの有効性はサーバーが判定する
    pub fn is_present(&self) -> bool {
        self.read().is_some()
    }

    /// 両方のストアからトークンとユーザー情報を無条件に削除する
    ///
    /// 個別の削除に失敗しても残りの削除は続行する。
    pub fn clear(&self) {
        for store in [self.durable.as_ref(), self.session.as_ref()] {
            for key in [TOKEN_KEY, USER_KEY] {
                if let Err(e) = store.remove(key) {
                    warn!(key, error = %e, "資格情報の削除に失敗しました");
                }
            }
        }
        info!("資格情報を破棄しました");
    }

    fn lookup(&self, key: &str) -> Option<String> {
        for store in [self.durable.as_ref(), self.session.as_ref()] {
            match store.get(key) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => warn!(key, error = %e, "ストアの読み込みに失敗しました"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        durable: Arc<MemoryStore>,
        session: Arc<MemoryStore>,
        store: CredentialStore,
    }

    fn fixture(policy: RememberPolicy) -> Fixture {
        let durable = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());
        let store = CredentialStore::new(durable.clone(), session.clone(), policy);
        Fixture {
            durable,
            session,
            store,
        }
    }

    fn sample_user() -> UserInfo {
        UserInfo {
            id: Some(3),
            name: "Layla Hassan".to_string(),
            email: "layla@teknosoft.com".to_string(),
            department: Some("UI/UX Designer".to_string()),
            role: None,
            photo: None,
        }
    }

    #[test]
    fn test_remember_me_selects_durable_store() {
        let f = fixture(RememberPolicy::Consistent);
        f.store.save("token-1", true).unwrap();
        f.store.save_user_info(&sample_user(), true).unwrap();

        assert_eq!(f.durable.get(TOKEN_KEY).unwrap().as_deref(), Some("token-1"));
        assert!(f.session.is_empty());
        assert_eq!(f.store.user_info(), Some(sample_user()));
    }

    #[test]
    fn test_session_login_replaces_remembered_token() {
        let f = fixture(RememberPolicy::Consistent);
        f.store.save("old-token", true).unwrap();
        f.store.save("new-token", false).unwrap();

        assert_eq!(f.durable.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(f.store.read().as_deref(), Some("new-token"));
    }

    #[test]
    fn test_durable_token_policy_ignores_flag_for_token() {
        let f = fixture(RememberPolicy::DurableToken);
        f.store.save("token-2", false).unwrap();
        f.store.save_user_info(&sample_user(), false).unwrap();

        assert_eq!(f.durable.get(TOKEN_KEY).unwrap().as_deref(), Some("token-2"));
        assert!(f.session.get(USER_KEY).unwrap().is_some());
        assert!(f.durable.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_read_prefers_durable_store() {
        let f = fixture(RememberPolicy::Consistent);
        f.session.set(TOKEN_KEY, "session-token").unwrap();
        assert_eq!(f.store.read().as_deref(), Some("session-token"));

        f.durable.set(TOKEN_KEY, "durable-token").unwrap();
        assert_eq!(f.store.read().as_deref(), Some("durable-token"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let f = fixture(RememberPolicy::Consistent);
        f.durable.set(TOKEN_KEY, "a").unwrap();
        f.durable.set(USER_KEY, "{}").unwrap();
        f.session.set(TOKEN_KEY, "b").unwrap();
        f.session.set(USER_KEY, "{}").unwrap();

        f.store.clear();
        f.store.clear();

        assert!(!f.store.is_present());
        assert!(f.durable.is_empty());
        assert!(f.session.is_empty());
    }

    #[test]
    fn test_update_user_info_keeps_location() {
        let f = fixture(RememberPolicy::Consistent);
        f.store.save_user_info(&sample_user(), false).unwrap();

        let mut updated = sample_user();
        updated.name = "Layla H.".to_string();
        f.store.update_user_info(&updated).unwrap();

        assert!(f.durable.get(USER_KEY).unwrap().is_none());
        assert_eq!(f.store.user_info().unwrap().name, "Layla H.");
    }

    #[test]
    fn test_empty_or_corrupt_entries_are_absent() {
        let f = fixture(RememberPolicy::Consistent);
        f.session.set(TOKEN_KEY, "").unwrap();
        f.session.set(USER_KEY, "not json").unwrap();

        assert!(!f.store.is_present());
        assert!(f.store.user_info().is_none());
    }
}
