use crate::application::borrowing::BorrowingApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーと、HTTPでは失敗として返す通常の結果
/// （冊数なし・貸出なし）をまとめ、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    Application(BorrowingApplicationError),
    /// 貸出可能な冊数がない
    NoCopiesAvailable,
    /// 返却する貸出がない
    NoActiveLoan,
    /// リクエストの値が受け付けられる範囲外
    InvalidRequest(String),
    /// ストアの直接操作で発生したエラー
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl From<BorrowingApplicationError> for ApiError {
    fn from(err: BorrowingApplicationError) -> Self {
        ApiError::Application(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found - 返却する貸出がない
            ApiError::NoActiveLoan => (
                StatusCode::NOT_FOUND,
                "NO_ACTIVE_LOAN",
                "No active loan for this borrower, book and branch".to_string(),
            ),

            // 409 Conflict - 貸出可能な冊数がない
            ApiError::NoCopiesAvailable => (
                StatusCode::CONFLICT,
                "NO_COPIES_AVAILABLE",
                "No copies of this book are available at this branch".to_string(),
            ),

            // 422 Unprocessable Entity - 参照先が存在しない
            ApiError::Application(BorrowingApplicationError::BorrowerNotFound) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BORROWER_NOT_FOUND",
                "Borrower not found".to_string(),
            ),
            ApiError::Application(BorrowingApplicationError::BookNotFound) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BOOK_NOT_FOUND",
                "Book not found".to_string(),
            ),
            ApiError::Application(BorrowingApplicationError::BranchNotFound) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "BRANCH_NOT_FOUND",
                "Branch not found".to_string(),
            ),
            ApiError::InvalidRequest(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", msg)
            }
            ApiError::Application(BorrowingApplicationError::DomainError(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "DOMAIN_ERROR", msg)
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Application(BorrowingApplicationError::TransactionError(e)) => {
                tracing::error!("Transaction error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TRANSACTION_ERROR",
                    "Failed to complete the transaction".to_string(),
                )
            }
            ApiError::Application(BorrowingApplicationError::DirectoryError(e)) => {
                tracing::error!("Directory error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIRECTORY_ERROR",
                    "Failed to access borrower, book or branch records".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
