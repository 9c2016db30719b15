//! クロスサイトリクエストフォージェリ（CSRF）対策トークンの発行と検証
//!
//! セッションに紐付く秘密値から、フォームごとに使い捨てのトークンを作る。
//! トークンは `<salt>.<digest>` 形式で、digest は salt と秘密値の SHA-256。
//! 同じ秘密値から何枚でも有効なトークンを作れるので、ストア側に状態は要らない。

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// 検証失敗の理由
///
/// ログ用にのみ使い、クライアントには区別せず拒否だけを返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CsrfError {
    #[error("session has no csrf secret")]
    MissingSecret,
    #[error("request carries no csrf token")]
    MissingToken,
    #[error("csrf token is malformed")]
    MalformedToken,
    #[error("csrf token does not match session")]
    Mismatch,
}

/// 新しいセッション秘密値（32バイト）
pub fn new_secret() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// 秘密値に紐付くトークンを発行する
pub fn mint_token(secret: &str) -> String {
    let bytes: [u8; 8] = rand::random();
    let salt = URL_SAFE_NO_PAD.encode(bytes);
    let digest = digest(&salt, secret);
    format!("{salt}.{digest}")
}

/// 送信されたトークンをセッションの秘密値と照合する
pub fn verify_token(secret: Option<&str>, token: Option<&str>) -> Result<(), CsrfError> {
    let secret = secret
        .filter(|s| !s.is_empty())
        .ok_or(CsrfError::MissingSecret)?;
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(CsrfError::MissingToken)?;

    let (salt, submitted) = token
        .split_once('.')
        .filter(|(salt, digest)| !salt.is_empty() && !digest.is_empty())
        .ok_or(CsrfError::MalformedToken)?;

    let expected = digest(salt, secret);
    if !constant_time_eq(expected.as_bytes(), submitted.as_bytes()) {
        return Err(CsrfError::Mismatch);
    }
    Ok(())
}

fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"-");
    hasher.update(secret.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
