use crate::domain::{BookId, ValidationErrors};
use crate::ports::{RatingServiceError, RepositoryError};
use thiserror::Error;

/// 書籍管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// フォーム入力が検証を通らなかった
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// 書籍が見つからない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 書籍ストアのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] RepositoryError),

    /// 評価サービスのエラー（期限切れを含む）
    #[error("Rating service error")]
    RatingServiceError(#[source] RatingServiceError),
}

impl From<RepositoryError> for BookApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => BookApplicationError::BookNotFound(id),
            other => BookApplicationError::RepositoryError(other),
        }
    }
}

impl From<RatingServiceError> for BookApplicationError {
    fn from(err: RatingServiceError) -> Self {
        BookApplicationError::RatingServiceError(err)
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
