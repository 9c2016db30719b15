use serde::{Deserialize, Serialize};
use std::fmt;

/// 書籍ID - ストアが作成時に採番する
///
/// 作成後は不変。ルーティング層では非負整数のみ受け付ける。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<u64> for BookId {
    type Error = std::num::TryFromIntError;

    /// パスパラメータ（u64）からの変換
    ///
    /// i64に収まらない値はどの書籍にも対応しないため失敗させる。
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Self)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
