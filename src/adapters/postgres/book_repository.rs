use crate::domain::{Book, BookFields, BookId};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        id: BookId::from_i64(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        release_date: row.get("release_date"),
        page_count: row.get("page_count"),
        publisher: row.get("publisher"),
    }
}

/// BookRepositoryのPostgreSQL実装
///
/// 各操作は単一のSQL文で完結するため、操作単位でアトミック。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    /// タイトル昇順で全件取得
    ///
    /// COLLATE "C" でバイト順の辞書式比較にそろえる。
    async fn list_all(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, release_date, page_count, publisher
            FROM books
            ORDER BY title COLLATE "C" ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::store)?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn create(&self, fields: BookFields) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (title, author, release_date, page_count, publisher)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, author, release_date, page_count, publisher
            "#,
        )
        .bind(fields.title())
        .bind(fields.author())
        .bind(fields.release_date())
        .bind(fields.page_count())
        .bind(fields.publisher())
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::store)?;

        Ok(map_row_to_book(&row))
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, author, release_date, page_count, publisher
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::store)?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 全フィールドを上書き（部分更新はしない）
    async fn update(&self, id: BookId, fields: BookFields) -> Result<Book> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                release_date = $4,
                page_count = $5,
                publisher = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, author, release_date, page_count, publisher
            "#,
        )
        .bind(id.value())
        .bind(fields.title())
        .bind(fields.author())
        .bind(fields.release_date())
        .bind(fields.page_count())
        .bind(fields.publisher())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::store)?;

        row.as_ref()
            .map(map_row_to_book)
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn delete_by_id(&self, id: BookId) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::store)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        Ok(())
    }
}
