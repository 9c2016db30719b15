use thiserror::Error;

/// 書籍フォームの検証エラー
///
/// 失敗したフィールドごとに1件のメッセージを、フィールド宣言順に保持する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", .0.join("; "))]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    /// 画面に表示するメッセージ一覧
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}
