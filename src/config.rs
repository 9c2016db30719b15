use std::time::Duration;
use thiserror::Error;

use crate::application::book::DEFAULT_RATING_TIMEOUT;

/// 設定値の読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// アプリケーション設定
///
/// 環境変数（`.env`があればそれも）から読み込む。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// 未設定の場合はインメモリストアで起動する
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub rating_service_url: String,
    pub rating_timeout: Duration,
    /// CSRFクッキーに`Secure`属性を付けるか
    pub csrf_cookie_secure: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            database_max_connections: 5,
            rating_service_url: "http://localhost:5000".to_string(),
            rating_timeout: DEFAULT_RATING_TIMEOUT,
            csrf_cookie_secure: false,
        }
    }
}

impl AppConfig {
    /// プロセスの環境変数から読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む（テスト用に環境変数から切り離してある）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            port: parse_or("PORT", &lookup, defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                &lookup,
                defaults.database_max_connections,
            )?,
            rating_service_url: lookup("RATING_SERVICE_URL")
                .unwrap_or(defaults.rating_service_url),
            rating_timeout: parse_timeout_ms(
                "RATING_TIMEOUT_MS",
                &lookup,
                defaults.rating_timeout,
            )?,
            csrf_cookie_secure: parse_or(
                "CSRF_COOKIE_SECURE",
                &lookup,
                defaults.csrf_cookie_secure,
            )?,
        })
    }
}

/// ミリ秒の期限。0は呼び出しが必ず失敗するため不正値として扱う
fn parse_timeout_ms(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(name) {
        Some(value) => match value.parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
        None => Ok(default),
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
