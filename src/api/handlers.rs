use crate::application::book::{self, BookApplicationError, ServiceDependencies};
use crate::domain::{BookDraft, BookId};
use crate::ports::RatingSubmission;
use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::{
    csrf::CsrfToken,
    error::ApiError,
    views::{self, BookFormKind},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
    /// CSRFクッキーに`Secure`属性を付けるか
    pub csrf_cookie_secure: bool,
}

/// パスパラメータを書籍IDに変換する
///
/// 非負整数でない値は抽出時点で400になる。
/// i64に収まらない値はどの書籍にも対応しないため404。
fn book_id(raw: u64) -> Result<BookId, ApiError> {
    BookId::try_from(raw).map_err(|_| ApiError::NotFound)
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET / - 書籍一覧（タイトル昇順）
pub async fn list_books(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let books = book::list_books(&state.service_deps).await?;
    Ok(Html(views::book_list(&books)))
}

/// GET /book/add - 追加フォーム
pub async fn show_add_form(Extension(csrf): Extension<CsrfToken>) -> Html<String> {
    Html(views::book_form(
        BookFormKind::Add,
        &book::new_book_draft(),
        &[],
        &csrf.0,
    ))
}

/// GET /book/edit/:id - 編集フォーム
///
/// 書籍が存在しない場合は404を返す。
pub async fn show_edit_form(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
) -> Result<Html<String>, ApiError> {
    let id = book_id(id)?;
    let book = book::get_book(&state.service_deps, id).await?;

    Ok(Html(views::book_form(
        BookFormKind::Edit(id),
        &BookDraft::from(&book),
        &[],
        &csrf.0,
    )))
}

/// GET /book/delete/:id - 削除確認
pub async fn show_delete_confirm(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
) -> Result<Html<String>, ApiError> {
    let book = book::get_book(&state.service_deps, book_id(id)?).await?;
    Ok(Html(views::book_delete(&book, &csrf.0)))
}

/// GET /book/details/:id - 詳細と平均評価
///
/// 評価サービスが失敗・期限切れでも、評価なしで詳細を描画する。
pub async fn show_details(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
) -> Result<Html<String>, ApiError> {
    let details = book::book_details(&state.service_deps, book_id(id)?).await?;
    Ok(Html(views::book_details(&details, &csrf.0)))
}

/// GET /book/rate/:id - 評価フォーム
pub async fn show_rate_form(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
) -> Result<Html<String>, ApiError> {
    let book = book::get_book(&state.service_deps, book_id(id)?).await?;
    Ok(Html(views::book_rate(
        book.id,
        Some(&book.title),
        &csrf.0,
        None,
    )))
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /book/add - 書籍を追加
///
/// 検証に失敗した場合は、送信値とエラーメッセージでフォームを再描画する。
pub async fn submit_add(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Form(draft): Form<BookDraft>,
) -> Result<Response, ApiError> {
    match book::add_book(&state.service_deps, &draft).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(BookApplicationError::Validation(errors)) => Ok(Html(views::book_form(
            BookFormKind::Add,
            &draft,
            errors.messages(),
            &csrf.0,
        ))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /book/edit/:id - 書籍を編集
///
/// 全フィールドを上書きする。検証失敗時はIDを保ったままフォームを再描画する。
pub async fn submit_edit(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
    Form(draft): Form<BookDraft>,
) -> Result<Response, ApiError> {
    let id = book_id(id)?;

    match book::edit_book(&state.service_deps, id, &draft).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(BookApplicationError::Validation(errors)) => Ok(Html(views::book_form(
            BookFormKind::Edit(id),
            &draft,
            errors.messages(),
            &csrf.0,
        ))
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /book/delete/:id - 書籍を削除
pub async fn submit_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Redirect, ApiError> {
    book::delete_book(&state.service_deps, book_id(id)?).await?;
    Ok(Redirect::to("/"))
}

/// POST /book/rate/:id - 評価を送信
///
/// 評価サービスの応答を待ってから応答する。
/// 失敗した場合は502でフォームとエラーを表示する。
pub async fn submit_rating(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    Path(id): Path<u64>,
    Form(rating): Form<RatingSubmission>,
) -> Result<Response, ApiError> {
    let id = book_id(id)?;

    match book::rate_book(&state.service_deps, id, &rating).await {
        Ok(_) => Ok(Redirect::to(&format!("/book/details/{id}")).into_response()),
        Err(BookApplicationError::RatingServiceError(_)) => Ok((
            StatusCode::BAD_GATEWAY,
            Html(views::book_rate(
                id,
                None,
                &csrf.0,
                Some(views::RATING_SUBMISSION_FAILED),
            )),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
