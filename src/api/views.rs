//! サーバー側で描画するHTMLページ
//!
//! ユーザー入力はすべて`escape`を通してから埋め込む。

use crate::application::book::BookDetails;
use crate::domain::{Book, BookDraft, BookId};
use axum::http::StatusCode;
use std::fmt::Write;

use super::csrf::CSRF_FIELD;

/// 評価送信に失敗したときの表示
pub const RATING_SUBMISSION_FAILED: &str =
    "The rating service is unavailable. Please try again later.";

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, csrf_token: Option<&str>, body: &str) -> String {
    let csrf_meta = csrf_token
        .map(|token| format!(r#"<meta name="csrf-token" content="{}">"#, escape(token)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
{csrf_meta}
<title>{title}</title>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn csrf_input(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{CSRF_FIELD}" value="{}">"#,
        escape(token)
    )
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|message| format!("<li>{}</li>", escape(message)))
        .collect();
    format!(r#"<ul class="errors">{items}</ul>"#)
}

/// GET / - 書籍一覧
pub fn book_list(books: &[Book]) -> String {
    let mut body = String::from(r#"<p><a href="/book/add">Add Book</a></p>"#);
    if books.is_empty() {
        body.push_str("<p>No books yet.</p>");
    } else {
        body.push_str("<table>\n<tr><th>Title</th><th>Author</th><th>Release Date</th><th>Page Count</th><th>Publisher</th><th></th></tr>\n");
        for book in books {
            let _ = writeln!(
                body,
                r#"<tr><td><a href="/book/details/{id}">{title}</a></td><td>{author}</td><td>{date}</td><td>{pages}</td><td>{publisher}</td><td><a href="/book/edit/{id}">Edit</a> <a href="/book/delete/{id}">Delete</a></td></tr>"#,
                id = book.id,
                title = escape(&book.title),
                author = escape(&book.author),
                date = book.release_date.format("%Y-%m-%d"),
                pages = book.page_count,
                publisher = escape(&book.publisher),
            );
        }
        body.push_str("</table>");
    }
    layout("Books", None, &body)
}

/// 追加・編集フォームの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFormKind {
    Add,
    Edit(BookId),
}

/// 追加・編集フォーム
///
/// 検証失敗時は送信された値とエラーメッセージを表示する。
pub fn book_form(
    kind: BookFormKind,
    draft: &BookDraft,
    errors: &[String],
    csrf_token: &str,
) -> String {
    let (title, action, submit) = match kind {
        BookFormKind::Add => ("Add Book", "/book/add".to_string(), "Add Book"),
        BookFormKind::Edit(id) => ("Edit Book", format!("/book/edit/{id}"), "Update Book"),
    };

    let field = |label: &str, name: &str, kind: &str, value: &str| {
        format!(
            r#"<p><label for="{name}">{label}</label> <input type="{kind}" id="{name}" name="{name}" value="{}"></p>"#,
            escape(value)
        )
    };

    let body = format!(
        r#"{errors}
<form action="{action}" method="post">
{csrf}
{title_field}
{author_field}
{date_field}
{pages_field}
{publisher_field}
<p><button type="submit">{submit}</button> <a href="/">Cancel</a></p>
</form>"#,
        errors = error_list(errors),
        csrf = csrf_input(csrf_token),
        title_field = field("Title", "title", "text", &draft.title),
        author_field = field("Author", "author", "text", &draft.author),
        date_field = field("Release Date", "releaseDate", "date", &draft.release_date),
        pages_field = field("Page Count", "pageCount", "number", &draft.page_count),
        publisher_field = field("Publisher", "publisher", "text", &draft.publisher),
    );
    layout(title, Some(csrf_token), &body)
}

/// 削除確認
pub fn book_delete(book: &Book, csrf_token: &str) -> String {
    let body = format!(
        r#"<p>Are you sure you want to delete <strong>{title}</strong>?</p>
<form action="/book/delete/{id}" method="post">
{csrf}
<p><button type="submit">Delete Book</button> <a href="/">Cancel</a></p>
</form>"#,
        title = escape(&book.title),
        id = book.id,
        csrf = csrf_input(csrf_token),
    );
    layout("Delete Book", Some(csrf_token), &body)
}

/// 詳細（評価が取得できなかった場合はその旨を表示）
pub fn book_details(details: &BookDetails, csrf_token: &str) -> String {
    let book = &details.book;
    let rating = match details.average_rating {
        Some(average) => format!(r#"<p class="rating">Average rating: {average:.1}</p>"#),
        None => r#"<p class="rating unavailable">Rating unavailable</p>"#.to_string(),
    };
    let body = format!(
        r#"<dl>
<dt>Title</dt><dd>{title}</dd>
<dt>Author</dt><dd>{author}</dd>
<dt>Release Date</dt><dd>{date}</dd>
<dt>Page Count</dt><dd>{pages}</dd>
<dt>Publisher</dt><dd>{publisher}</dd>
</dl>
{rating}
<p><a href="/book/rate/{id}">Rate this book</a> <a href="/">Back to list</a></p>"#,
        title = escape(&book.title),
        author = escape(&book.author),
        date = book.release_date.format("%Y-%m-%d"),
        pages = book.page_count,
        publisher = escape(&book.publisher),
        id = book.id,
    );
    layout("Book details", Some(csrf_token), &body)
}

/// 評価フォーム
///
/// 送信失敗時は`error`を表示する。
pub fn book_rate(
    book_id: BookId,
    book_title: Option<&str>,
    csrf_token: &str,
    error: Option<&str>,
) -> String {
    let heading = book_title
        .map(|title| format!("<p>Rating <strong>{}</strong></p>", escape(title)))
        .unwrap_or_default();
    let error = error
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape(message)))
        .unwrap_or_default();
    let body = format!(
        r#"{heading}
{error}
<form action="/book/rate/{book_id}" method="post">
{csrf}
<p><label for="value">Rating</label> <input type="number" id="value" name="value" min="1" max="5"></p>
<p><label for="email">Email</label> <input type="email" id="email" name="email"></p>
<p><button type="submit">Rate Book</button> <a href="/book/details/{book_id}">Cancel</a></p>
</form>"#,
        csrf = csrf_input(csrf_token),
    );
    layout("Rate Book", Some(csrf_token), &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<p>{}</p>
<p><a href="/">Back to list</a></p>"#,
        escape(message)
    );
    layout(status.canonical_reason().unwrap_or("Error"), None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn book() -> Book {
        Book {
            id: BookId::from_i64(3),
            title: "Dune <Deluxe>".to_string(),
            author: "Herbert".to_string(),
            release_date: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            page_count: 412,
            publisher: "Chilton".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_list_escapes_titles() {
        let html = book_list(&[book()]);
        assert!(html.contains("Dune &lt;Deluxe&gt;"));
        assert!(html.contains(r#"href="/book/edit/3""#));
    }

    #[test]
    fn test_form_keeps_submitted_values_and_errors() {
        let draft = BookDraft {
            title: String::new(),
            author: "Herbert".to_string(),
            release_date: "1965-08-01".to_string(),
            page_count: "412".to_string(),
            publisher: "Chilton".to_string(),
        };
        let html = book_form(
            BookFormKind::Edit(BookId::from_i64(3)),
            &draft,
            &["Please provide a value for Title".to_string()],
            "salt.digest",
        );

        assert!(html.contains(r#"action="/book/edit/3""#));
        assert!(html.contains(r#"name="author" value="Herbert""#));
        assert!(html.contains("<li>Please provide a value for Title</li>"));
        assert!(html.contains(r#"name="_csrf" value="salt.digest""#));
    }

    #[test]
    fn test_details_without_rating() {
        let details = BookDetails {
            book: book(),
            average_rating: None,
        };
        let html = book_details(&details, "t.t");
        assert!(html.contains("Rating unavailable"));
        assert!(html.contains("Herbert"));
    }

    #[test]
    fn test_details_with_rating() {
        let details = BookDetails {
            book: book(),
            average_rating: Some(4.5),
        };
        assert!(book_details(&details, "t.t").contains("Average rating: 4.5"));
    }
}
