use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, create_book, create_borrower, create_branch, get_copies,
    list_borrowed_books, list_branches_with_loans, return_book, set_copies,
};

/// Creates the API router with all borrowing endpoints
///
/// Directory endpoints:
/// - POST /borrowers, POST /books, POST /branches
///
/// Copy inventory:
/// - GET|PUT /branches/:branch_id/books/:book_id/copies
///
/// Loans:
/// - POST /loans - Borrow a book
/// - POST /loans/return - Return a book
/// - GET /borrowers/:borrower_id/loans - Active loans of a borrower
/// - GET /borrowers/:borrower_id/branches - Branches holding the borrower's loans
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Directory endpoints
        .route("/borrowers", post(create_borrower))
        .route("/books", post(create_book))
        .route("/branches", post(create_branch))
        .route(
            "/branches/:branch_id/books/:book_id/copies",
            get(get_copies).put(set_copies),
        )
        // Loan endpoints
        .route("/loans", post(borrow_book))
        .route("/loans/return", post(return_book))
        .route("/borrowers/:borrower_id/loans", get(list_borrowed_books))
        .route("/borrowers/:borrower_id/branches", get(list_branches_with_loans))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
