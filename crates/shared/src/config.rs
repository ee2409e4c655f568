use crate::errors::ClientError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@teknosoft.com";
pub const DEFAULT_STORAGE_DIR: &str = ".team-dashboard";
pub const DURABLE_STORE_FILE: &str = "durable.json";

/// remember-me フラグによる保存先の方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RememberPolicy {
    /// トークンとユーザー情報を同じストアに保存する
    #[default]
    Consistent,
    /// トークンは常に永続ストア、ユーザー情報のみフラグで切り替える
    DurableToken,
}

impl FromStr for RememberPolicy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consistent" => Ok(RememberPolicy::Consistent),
            "durable-token" | "durable_token" => Ok(RememberPolicy::DurableToken),
            other => Err(ClientError::Configuration(format!(
                "Unknown REMEMBER_POLICY: {other}"
            ))),
        }
    }
}

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ClientError::Configuration(format!(
                "Unknown LOG_FORMAT: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub admin_email: String,
    pub storage_dir: PathBuf,
    pub remember_policy: RememberPolicy,
    pub environment: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            remember_policy: RememberPolicy::default(),
            environment: "dev".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を構築
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let defaults = Config::default();

        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);
        if api_base_url.is_empty() {
            return Err(ClientError::Configuration(
                "API_BASE_URL must not be empty".to_string(),
            ));
        }

        Ok(Config {
            api_base_url,
            admin_email: lookup("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            storage_dir: lookup("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            remember_policy: lookup("REMEMBER_POLICY")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or_default(),
            environment: lookup("ENVIRONMENT").unwrap_or(defaults.environment),
            log_format: lookup("LOG_FORMAT")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// 永続ストアのファイルパス
    pub fn durable_store_path(&self) -> PathBuf {
        self.storage_dir.join(DURABLE_STORE_FILE)
    }
}
