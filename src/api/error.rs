use crate::application::book::BookApplicationError;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::views;

/// API層のエラー型
///
/// アプリケーション層のエラーとHTTP固有の拒否理由をまとめ、
/// HTMLエラーページへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Application(BookApplicationError),
    /// CSRFトークンの検証に失敗した（理由は返さない）
    Forbidden,
    /// ストアに存在しえないID
    NotFound,
    PayloadTooLarge,
}

impl From<BookApplicationError> for ApiError {
    fn from(err: BookApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Invalid or missing form token"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Book not found"),
            ApiError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Form is too large"),

            // 404 Not Found - リクエストされた書籍が存在しない
            ApiError::Application(BookApplicationError::BookNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Book not found")
            }

            // 通常はハンドラーがフォームを再描画するためここには来ない
            ApiError::Application(BookApplicationError::Validation(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The submitted book is invalid",
            ),

            // 502 Bad Gateway - 外部の評価サービスの障害
            ApiError::Application(BookApplicationError::RatingServiceError(ref e)) => {
                tracing::error!("Rating service error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "The rating service is unavailable. Please try again later.",
                )
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Application(BookApplicationError::RepositoryError(ref e)) => {
                tracing::error!("Book repository error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred",
                )
            }
        };

        (status, Html(views::error_page(status, message))).into_response()
    }
}
