use axum::{
    Router,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::csrf::Protection::{self, Mint, Open, Verify};
use super::handlers::{
    AppState, health_check, list_books, show_add_form, show_delete_confirm, show_details,
    show_edit_form, show_rate_form, submit_add, submit_delete, submit_edit, submit_rating,
};

/// Creates the router with all book catalog endpoints
///
/// Each route declares its CSRF protection:
/// - Open: GET /, GET /health
/// - Mint (renders a form that can mutate): GET /book/add, /book/edit/:id,
///   /book/delete/:id, /book/details/:id, /book/rate/:id
/// - Verify (mutates): POST /book/add, /book/edit/:id, /book/delete/:id,
///   /book/rate/:id
///
/// `:id` is extracted as `u64`, so non-numeric or negative ids are
/// rejected with 400 before any handler runs.
pub fn create_router(state: Arc<AppState>) -> Router {
    let guard = |protection: Protection, method_router: MethodRouter<Arc<AppState>>| {
        protection.apply(&state, method_router)
    };

    let routes = Router::new()
        .route("/health", guard(Open, get(health_check)))
        .route("/", guard(Open, get(list_books)))
        .route(
            "/book/add",
            guard(Mint, get(show_add_form)).merge(guard(Verify, post(submit_add))),
        )
        .route(
            "/book/edit/:id",
            guard(Mint, get(show_edit_form)).merge(guard(Verify, post(submit_edit))),
        )
        .route(
            "/book/delete/:id",
            guard(Mint, get(show_delete_confirm)).merge(guard(Verify, post(submit_delete))),
        )
        .route("/book/details/:id", guard(Mint, get(show_details)))
        .route(
            "/book/rate/:id",
            guard(Mint, get(show_rate_form)).merge(guard(Verify, post(submit_rating))),
        );

    routes
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}
