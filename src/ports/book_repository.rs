use crate::domain::{Book, BookFields, BookId};
use async_trait::async_trait;
use thiserror::Error;

/// 書籍リポジトリのエラー
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 指定IDの書籍が存在しない
    #[error("Book {0} not found")]
    NotFound(BookId),

    /// ストア側の障害
    #[error("Book store error")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Store(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// 書籍リポジトリポート
///
/// 書籍ストアに対するCRUD操作を抽象化する。
/// 各操作はストアに対してアトミックで、読み手が書きかけの書籍を観測することはない。
/// 同一IDへの並行更新は後勝ち。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// すべての書籍をタイトル昇順で返す
    async fn list_all(&self) -> Result<Vec<Book>>;

    /// 新しい書籍を保存し、採番されたIDを含む書籍を返す
    ///
    /// 検証済みのフィールドのみ受け付けるため、ここでは再検証しない。
    async fn create(&self, fields: BookFields) -> Result<Book>;

    /// IDで書籍を取得する
    ///
    /// 存在しない場合はエラーではなく`None`を返す。
    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>>;

    /// 書籍のすべての可変フィールドを上書きする
    ///
    /// 存在しない場合は`RepositoryError::NotFound`。
    async fn update(&self, id: BookId, fields: BookFields) -> Result<Book>;

    /// 書籍を削除する
    ///
    /// 存在しない場合は`RepositoryError::NotFound`。
    async fn delete_by_id(&self, id: BookId) -> Result<()>;
}
