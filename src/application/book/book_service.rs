use crate::domain::{self, Book, BookDraft, BookId};
use crate::ports::*;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::errors::{BookApplicationError, Result};

/// 評価サービス呼び出しの既定の期限
pub const DEFAULT_RATING_TIMEOUT: Duration = Duration::from_millis(3000);

/// サービスの依存関係
///
/// ストアと評価サービスはトレイトオブジェクトとして注入する。
/// テストではインメモリ実装やモックに差し替えられる。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub rating_service: Arc<dyn RatingService>,
    /// 評価サービス呼び出し1回あたりの期限
    pub rating_timeout: Duration,
}

/// 詳細画面用のビュー
///
/// 評価サービスが応答しなかった場合、`average_rating`は`None`になる。
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetails {
    pub book: Book,
    pub average_rating: Option<f64>,
}

/// 評価サービス呼び出しに期限を付ける
///
/// 期限切れは他の評価サービスエラーと同じく`RatingServiceError`として扱う。
async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = rating_service::Result<T>>,
) -> rating_service::Result<T> {
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| RatingServiceError::Timeout(deadline))?
}

/// すべての書籍をタイトル昇順で取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    Ok(deps.book_repository.list_all().await?)
}

/// 追加フォーム用の空の下書き
pub fn new_book_draft() -> BookDraft {
    BookDraft::default()
}

/// 書籍を追加する
///
/// 検証 → 保存の順に実行し、検証に失敗した場合はストアに触れない。
pub async fn add_book(deps: &ServiceDependencies, draft: &BookDraft) -> Result<Book> {
    let fields = domain::validate_book(draft)?;

    let book = deps.book_repository.create(fields).await?;

    tracing::info!(book_id = %book.id, title = %book.title, "book created");
    Ok(book)
}

/// IDで書籍を取得する
///
/// 存在しない場合は`BookNotFound`。
pub async fn get_book(deps: &ServiceDependencies, id: BookId) -> Result<Book> {
    deps.book_repository
        .get_by_id(id)
        .await?
        .ok_or(BookApplicationError::BookNotFound(id))
}

/// 書籍を編集する
///
/// 全フィールドをまとめて上書きする。検証に失敗した場合はストアに触れない。
pub async fn edit_book(deps: &ServiceDependencies, id: BookId, draft: &BookDraft) -> Result<Book> {
    let fields = domain::validate_book(draft)?;

    let book = deps.book_repository.update(id, fields).await?;

    tracing::info!(book_id = %id, "book updated");
    Ok(book)
}

/// 書籍を削除する
pub async fn delete_book(deps: &ServiceDependencies, id: BookId) -> Result<()> {
    deps.book_repository.delete_by_id(id).await?;

    tracing::info!(book_id = %id, "book deleted");
    Ok(())
}

/// 書籍の詳細と平均評価を取得する
///
/// 評価サービスの失敗・期限切れは詳細表示を妨げない。
/// その場合は評価なしとして返す。
pub async fn book_details(deps: &ServiceDependencies, id: BookId) -> Result<BookDetails> {
    let book = get_book(deps, id).await?;

    let average_rating = match with_deadline(
        deps.rating_timeout,
        deps.rating_service.fetch_average(id),
    )
    .await
    {
        Ok(average) => Some(average),
        Err(e) => {
            tracing::warn!(book_id = %id, error = %e, "rating lookup failed, rendering without rating");
            None
        }
    };

    Ok(BookDetails {
        book,
        average_rating,
    })
}

/// 評価を送信する
///
/// 失敗は呼び出し元に返し、呼び出し元が必ず応答を完了させる。
pub async fn rate_book(
    deps: &ServiceDependencies,
    id: BookId,
    rating: &RatingSubmission,
) -> Result<RatingAck> {
    let ack = with_deadline(
        deps.rating_timeout,
        deps.rating_service.submit_rating(id, rating),
    )
    .await
    .inspect_err(|e| tracing::warn!(book_id = %id, error = %e, "rating submission failed"))?;

    tracing::info!(book_id = %id, "rating submitted");
    Ok(ack)
}
