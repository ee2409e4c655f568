use crate::credential_store::CredentialStore;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{ClientError, Config};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// サーバーがメッセージを返さなかった場合の既定メッセージ
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong";

/// 401応答による強制ログアウトの通知先
pub trait ForcedLogoutListener: Send + Sync {
    fn on_forced_logout(&self);
}

/// 1回の呼び出しのオプション
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// `false` の場合ベアラートークンを付与せず、401も通常のエラーとして返す
    pub authenticated: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            authenticated: true,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn post<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    pub fn put<B: Serialize>(body: &B) -> Result<Self, ClientError> {
        Ok(Self {
            method: Method::PUT,
            body: Some(serde_json::to_value(body)?),
            ..Self::default()
        })
    }

    /// ログインなど認証前のリクエスト
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// 既定ヘッダーを上書きする
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// すべてのネットワーク呼び出しの単一窓口
///
/// ベアラートークンを付与し、エラー応答を `ClientError` に正規化する。
/// 認証済みリクエストが401を受け取った場合は資格情報を破棄し、
/// 登録されたリスナーへ強制ログアウトを通知してから `AuthorizationExpired` を返す。
/// 自動リトライは行わない。
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialStore>,
    listeners: RwLock<Vec<Arc<dyn ForcedLogoutListener>>>,
}

impl ApiGateway {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            credentials,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 設定のオリジンに reqwest で接続するゲートウェイ
    pub fn from_config(config: &Config, credentials: Arc<CredentialStore>) -> Self {
        Self::new(
            config.api_base_url.clone(),
            Arc::new(ReqwestTransport::new()),
            credentials,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// 強制ログアウトのリスナーを登録
    pub fn on_forced_logout(&self, listener: Arc<dyn ForcedLogoutListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ClientError> {
        self.call(endpoint, RequestOptions::get()).await
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call(endpoint, RequestOptions::post(body)?).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        self.call(endpoint, RequestOptions::put(body)?).await
    }

    /// 応答ボディを読み捨てる削除呼び出し
    pub async fn delete(&self, endpoint: &str) -> Result<(), ClientError> {
        self.call_value(endpoint, RequestOptions::delete())
            .await
            .map(|_| ())
    }

    /// 呼び出して応答を型付きで返す
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let value = self.call_value(endpoint, options).await?;
        serde_json::from_value(value).map_err(|e| {
            warn!(endpoint, error = %e, "応答の形式が想定と異なります");
            ClientError::Decode(format!("{endpoint}: {e}"))
        })
    }

    /// 呼び出して応答をJSON値のまま返す（空ボディは `Value::Null`）
    pub async fn call_value(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ClientError> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "api_call",
            %request_id,
            method = %options.method,
            endpoint,
        );
        self.execute(endpoint, options, request_id)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        endpoint: &str,
        options: RequestOptions,
        request_id: Uuid,
    ) -> Result<Value, ClientError> {
        let request = self.build_request(endpoint, &options, request_id)?;
        let started = Instant::now();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "サーバーに接続できません");
                return Err(ClientError::Network(e.to_string()));
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        if response.status == 401 && options.authenticated {
            warn!(status = response.status, duration_ms, "認可切れのため強制ログアウトします");
            self.force_logout();
            return Err(ClientError::AuthorizationExpired);
        }

        let parsed = parse_body(&response.body);

        if !response.is_success() {
            let message = parsed
                .as_ref()
                .ok()
                .and_then(server_message)
                .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
            warn!(status = response.status, duration_ms, %message, "APIエラー応答");
            return Err(ClientError::api(response.status, message));
        }

        info!(status = response.status, duration_ms, "API呼び出し完了");
        parsed.map_err(|e| ClientError::Decode(format!("{endpoint}: {e}")))
    }

    fn build_request(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        request_id: Uuid,
    ) -> Result<HttpRequest, ClientError> {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Request-ID".to_string(), request_id.to_string()),
        ];

        if options.authenticated {
            if let Some(token) = self.credentials.read() {
                headers.push(("Authorization".to_string(), format!("Bearer {token}")));
            } else {
                debug!("トークンが無いため Authorization ヘッダーを付与しません");
            }
        }

        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        let body = options
            .body
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        Ok(HttpRequest {
            method: options.method.clone(),
            url: format!("{}{}", self.base_url, endpoint),
            headers,
            body,
        })
    }

    fn force_logout(&self) {
        self.credentials.clear();
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_forced_logout();
        }
    }
}

fn parse_body(body: &str) -> Result<Value, serde_json::Error> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
}

fn server_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
