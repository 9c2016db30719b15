//! 書籍フォームの検証パイプライン
//!
//! フィールドごとに「ルールとメッセージ」の順序付きリストを宣言する。
//! 1フィールド内では最初に失敗したルールで評価を打ち切り、
//! フィールド間では打ち切らずにすべて評価する。
//! 入力文字列だけに依存する純粋関数で、I/Oは行わない。

use chrono::{DateTime, NaiveDate};

use super::{BookDraft, BookFields, ValidationErrors};

/// 検証対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    ReleaseDate,
    PageCount,
    Publisher,
}

impl BookField {
    fn value(self, draft: &BookDraft) -> &str {
        match self {
            BookField::Title => &draft.title,
            BookField::Author => &draft.author,
            BookField::ReleaseDate => &draft.release_date,
            BookField::PageCount => &draft.page_count,
            BookField::Publisher => &draft.publisher,
        }
    }
}

/// 単一の検証ルール
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// 値が送信されていて空でない
    Required,
    /// 文字数が上限以下
    MaxChars(usize),
    /// NUL文字を含まない（PostgreSQLのテキスト型に保存できない）
    NoNulChars,
    /// ISO-8601の日付
    Iso8601Date,
    /// 0以上の整数
    NonNegativeInt,
}

impl Rule {
    pub fn passes(self, value: &str) -> bool {
        match self {
            Rule::Required => !value.is_empty(),
            Rule::MaxChars(max) => value.chars().count() <= max,
            Rule::NoNulChars => !value.contains('\0'),
            Rule::Iso8601Date => parse_iso8601_date(value).is_some(),
            Rule::NonNegativeInt => parse_non_negative_int(value).is_some(),
        }
    }
}

/// 1フィールド分のルールチェーン
#[derive(Debug)]
pub struct FieldRules {
    pub field: BookField,
    pub checks: &'static [(Rule, &'static str)],
}

impl FieldRules {
    /// 最初に失敗したルールのメッセージを返す
    pub fn first_failure(&self, draft: &BookDraft) -> Option<&'static str> {
        let value = self.field.value(draft);
        self.checks
            .iter()
            .find(|(rule, _)| !rule.passes(value))
            .map(|(_, message)| *message)
    }
}

pub const TITLE_MAX_CHARS: usize = 255;
pub const AUTHOR_MAX_CHARS: usize = 100;
pub const PUBLISHER_MAX_CHARS: usize = 100;

/// 書籍フォームのルール表（宣言順がエラーメッセージの順序になる）
pub const BOOK_RULES: [FieldRules; 5] = [
    FieldRules {
        field: BookField::Title,
        checks: &[
            (Rule::Required, "Please provide a value for Title"),
            (Rule::NoNulChars, "Title must not contain NUL characters"),
            (
                Rule::MaxChars(TITLE_MAX_CHARS),
                "Title must not be more than 255 characters long",
            ),
        ],
    },
    FieldRules {
        field: BookField::Author,
        checks: &[
            (Rule::Required, "Please provide a value for Author"),
            (Rule::NoNulChars, "Author must not contain NUL characters"),
            (
                Rule::MaxChars(AUTHOR_MAX_CHARS),
                "Author must not be more than 100 characters long",
            ),
        ],
    },
    FieldRules {
        field: BookField::ReleaseDate,
        checks: &[
            (Rule::Required, "Please provide a value for Release Date"),
            (
                Rule::Iso8601Date,
                "Please provide a valid date for Release Date",
            ),
        ],
    },
    FieldRules {
        field: BookField::PageCount,
        checks: &[
            (Rule::Required, "Please provide a value for Page Count"),
            (
                Rule::NonNegativeInt,
                "Please provide a valid integer for Page Count",
            ),
        ],
    },
    FieldRules {
        field: BookField::Publisher,
        checks: &[
            (Rule::Required, "Please provide a value for Publisher"),
            (Rule::NoNulChars, "Publisher must not contain NUL characters"),
            (
                Rule::MaxChars(PUBLISHER_MAX_CHARS),
                "Publisher must not be more than 100 characters long",
            ),
        ],
    },
];

/// 書籍フォームを検証する
///
/// すべてのフィールドが通れば型付きの`BookFields`を、
/// そうでなければ失敗フィールドごとのメッセージを返す。
pub fn validate_book(draft: &BookDraft) -> Result<BookFields, ValidationErrors> {
    let messages: Vec<String> = BOOK_RULES
        .iter()
        .filter_map(|rules| rules.first_failure(draft))
        .map(str::to_string)
        .collect();

    match (
        messages.is_empty(),
        parse_iso8601_date(&draft.release_date),
        parse_non_negative_int(&draft.page_count),
    ) {
        (true, Some(release_date), Some(page_count)) => Ok(BookFields {
            title: draft.title.clone(),
            author: draft.author.clone(),
            release_date,
            page_count,
            publisher: draft.publisher.clone(),
        }),
        _ => Err(ValidationErrors::new(messages)),
    }
}

/// `YYYY-MM-DD`またはRFC 3339の日時（日付部分を採用）
fn parse_iso8601_date(value: &str) -> Option<NaiveDate> {
    if value.len() == 10 {
        // chronoは数値前の空白や符号付きの年を受け付けるため、形を先に確かめる
        if !is_calendar_date_shape(value.as_bytes()) {
            return None;
        }
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

fn is_calendar_date_shape(bytes: &[u8]) -> bool {
    bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    })
}

fn parse_non_negative_int(value: &str) -> Option<i32> {
    value.parse::<i32>().ok().filter(|n| *n >= 0)
}
