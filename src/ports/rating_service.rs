use crate::domain::BookId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 評価サービスのエラー
///
/// ネットワーク障害・非成功ステータス・不正なレスポンス・期限切れを区別する。
#[derive(Debug, Error)]
pub enum RatingServiceError {
    #[error("Rating service request failed: {0}")]
    Request(String),

    #[error("Rating service responded with status {0}")]
    UnexpectedStatus(u16),

    #[error("Rating service returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rating service did not respond within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, RatingServiceError>;

/// 評価の送信内容
///
/// 値の解釈は外部サービスが行うため、フォームの文字列をそのまま渡す。
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct RatingSubmission {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub email: String,
}

/// 評価送信に対するサービスの応答（中身は解釈しない）
pub type RatingAck = serde_json::Value;

/// 評価サービスポート
///
/// 書籍IDで紐付く外部の評価マイクロサービスとの境界。
/// このシステムは評価を保持・集計しない。
#[async_trait]
pub trait RatingService: Send + Sync {
    /// 書籍の平均評価を取得する
    async fn fetch_average(&self, book_id: BookId) -> Result<f64>;

    /// 新しい評価を送信する
    async fn submit_rating(&self, book_id: BookId, rating: &RatingSubmission) -> Result<RatingAck>;
}
