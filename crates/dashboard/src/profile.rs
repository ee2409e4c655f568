use domain::{ProfileUpdate, UserInfo};
use infrastructure::{CredentialStore, UserApi};
use shared::ClientError;
use std::sync::Arc;
use tracing::info;

/// プロフィール画面
pub struct ProfileEditor {
    api: UserApi,
    credentials: Arc<CredentialStore>,
}

impl ProfileEditor {
    pub fn new(api: UserApi, credentials: Arc<CredentialStore>) -> Self {
        Self { api, credentials }
    }

    pub async fn load(&self) -> Result<UserInfo, ClientError> {
        self.api.profile().await
    }

    /// プロフィールを更新し、キャッシュ済みのユーザー情報にも反映する
    pub async fn update(&self, update: &ProfileUpdate) -> Result<UserInfo, ClientError> {
        update.validate()?;
        self.api.update_profile(update).await?;

        let mut cached = self.credentials.user_info().unwrap_or_default();
        update.apply_to(&mut cached);
        self.credentials.update_user_info(&cached)?;

        info!("プロフィールを更新しました");
        Ok(cached)
    }
}
