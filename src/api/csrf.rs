use crate::application::csrf::{self, CsrfError};
use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{error::ApiError, handlers::AppState};

/// セッション秘密値を保持するクッキー名
pub const CSRF_COOKIE: &str = "_csrf";

/// フォームでトークンを送るフィールド名
pub const CSRF_FIELD: &str = "_csrf";

/// トークンを受け付けるヘッダー名（先頭から順に参照）
pub const CSRF_HEADERS: [&str; 2] = ["x-csrf-token", "csrf-token"];

/// 検証のためにバッファするフォーム本文の上限
const MAX_FORM_BYTES: usize = 64 * 1024;

/// フォームに埋め込むトークン
///
/// Mint/Verify ルートではミドルウェアがリクエスト拡張に入れる。
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

/// ルートごとの保護レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// 読み取り専用。トークン不要
    Open,
    /// 変更フォームを描画する。トークンを発行する
    Mint,
    /// 状態を変更する。トークンを検証し、再描画用に新しいトークンを発行する
    Verify,
}

impl Protection {
    /// メソッドルーターに保護レベルに応じたミドルウェアを付ける
    pub fn apply(
        self,
        state: &Arc<AppState>,
        method_router: MethodRouter<Arc<AppState>>,
    ) -> MethodRouter<Arc<AppState>> {
        match self {
            Protection::Open => method_router,
            Protection::Mint => {
                method_router.route_layer(middleware::from_fn_with_state(state.clone(), mint))
            }
            Protection::Verify => method_router.route_layer(middleware::from_fn(verify)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsrfField {
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

/// クッキーからセッション秘密値を取り出す
fn session_secret(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// ヘッダー、なければフォーム本文の`_csrf`からトークンを取り出す
fn submitted_token(headers: &HeaderMap, body: &[u8]) -> Option<String> {
    CSRF_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            serde_urlencoded::from_bytes::<CsrfField>(body)
                .ok()
                .and_then(|field| field.csrf)
        })
}

fn session_cookie(secret: &str, secure: bool) -> Option<HeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{CSRF_COOKIE}={secret}; Path=/; HttpOnly; SameSite=Lax{secure}"
    ))
    .ok()
}

/// トークン発行ミドルウェア
///
/// セッション秘密値がなければ作成し、レスポンスでクッキーを設定する。
pub async fn mint(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = session_secret(request.headers());
    let secret = existing.clone().unwrap_or_else(csrf::new_secret);

    request
        .extensions_mut()
        .insert(CsrfToken(csrf::mint_token(&secret)));

    let mut response = next.run(request).await;

    if existing.is_none() {
        match session_cookie(&secret, state.csrf_cookie_secure) {
            Some(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            None => tracing::warn!("could not encode csrf session cookie"),
        }
    }
    response
}

/// トークン検証ミドルウェア
///
/// 失敗した場合はハンドラーを実行せず403を返す。
/// 本文は検証のために読み込み、ハンドラー用に戻す。
pub async fn verify(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(uri = %parts.uri, error = %e, "could not buffer form body");
            return ApiError::PayloadTooLarge.into_response();
        }
    };

    let secret = session_secret(&parts.headers);
    let token = submitted_token(&parts.headers, &bytes);
    let verified = csrf::verify_token(secret.as_deref(), token.as_deref());

    let Some(secret) = secret.filter(|_| verified.is_ok()) else {
        let reason = verified.err().unwrap_or(CsrfError::MissingSecret);
        tracing::warn!(
            method = %parts.method,
            uri = %parts.uri,
            reason = %reason,
            "rejected request with invalid csrf token"
        );
        return ApiError::Forbidden.into_response();
    };

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request
        .extensions_mut()
        .insert(CsrfToken(csrf::mint_token(&secret)));

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_secret_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; _csrf=abc123; lang=en"),
        );
        assert_eq!(session_secret(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_secret_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_secret(&headers), None);
        assert_eq!(session_secret(&HeaderMap::new()), None);
    }

    #[test]
    fn test_submitted_token_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-csrf-token", HeaderValue::from_static("from-header"));
        let token = submitted_token(&headers, b"_csrf=from-body&title=Dune");
        assert_eq!(token.as_deref(), Some("from-header"));
    }

    #[test]
    fn test_submitted_token_from_form_body() {
        let token = submitted_token(&HeaderMap::new(), b"title=Dune&_csrf=abc.def");
        assert_eq!(token.as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_submitted_token_missing() {
        assert_eq!(submitted_token(&HeaderMap::new(), b"title=Dune"), None);
        assert_eq!(submitted_token(&HeaderMap::new(), b""), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", true).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "_csrf=abc; Path=/; HttpOnly; SameSite=Lax; Secure"
        );
    }
}
