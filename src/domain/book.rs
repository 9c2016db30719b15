use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍エンティティ
///
/// リポジトリから取得できる書籍は常にすべてのフィールド制約を満たす。
/// 不正な値は`BookFields`を経由できないため永続化されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub release_date: NaiveDate,
    pub page_count: i32,
    pub publisher: String,
}

impl Book {
    /// 検証済みフィールドと採番済みIDから書籍を組み立てる
    pub fn from_fields(id: BookId, fields: BookFields) -> Self {
        Self {
            id,
            title: fields.title,
            author: fields.author,
            release_date: fields.release_date,
            page_count: fields.page_count,
            publisher: fields.publisher,
        }
    }
}

/// 検証済みの書籍フィールド
///
/// `validation::validate_book`だけが生成できる。
/// 作成・更新時はこの型を丸ごと渡す（部分更新はしない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub(super) title: String,
    pub(super) author: String,
    pub(super) release_date: NaiveDate,
    pub(super) page_count: i32,
    pub(super) publisher: String,
}

impl BookFields {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    pub fn page_count(&self) -> i32 {
        self.page_count
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }
}

/// フォームから送信された未検証の書籍
///
/// 検証失敗時にフォームへ入力値を戻すためだけに使う一時的な表現。
/// 永続化されることはない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub page_count: String,
    #[serde(default)]
    pub publisher: String,
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            release_date: book.release_date.format("%Y-%m-%d").to_string(),
            page_count: book.page_count.to_string(),
            publisher: book.publisher.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_from_book_uses_iso_date() {
        let book = Book {
            id: BookId::from_i64(7),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            release_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            page_count: 412,
            publisher: "Chilton".to_string(),
        };

        let draft = BookDraft::from(&book);

        assert_eq!(draft.release_date, "1965-08-01");
        assert_eq!(draft.page_count, "412");
        assert_eq!(draft.title, "Dune");
    }

    #[test]
    fn test_draft_deserializes_form_field_names() {
        let draft: BookDraft =
            serde_urlencoded::from_str("title=Dune&releaseDate=1965-08-01&pageCount=412").unwrap();

        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.release_date, "1965-08-01");
        assert_eq!(draft.page_count, "412");
        // 送信されなかったフィールドは空文字になる
        assert_eq!(draft.author, "");
        assert_eq!(draft.publisher, "");
    }
}
