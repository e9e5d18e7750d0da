use crate::application::borrowing::{
    self, BorrowingApplicationError, ServiceDependencies, borrow_book as execute_borrow_book,
    borrowed_books as execute_borrowed_books, branches_with_loans as execute_branches_with_loans,
    return_book as execute_return_book,
};
use crate::domain::value_objects::{BookId, BorrowerId, BranchId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{
        BookResponse, BookReturnedResponse, BorrowBookRequest, BorrowerResponse, BranchResponse,
        CopiesResponse, CreateBookRequest, CreateBorrowerRequest, CreateBranchRequest,
        LoanResponse, MAX_COPIES, ReturnBookRequest, SetCopiesRequest,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Directory handlers
// ============================================================================

/// POST /borrowers - 利用者を登録
pub async fn create_borrower(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBorrowerRequest>,
) -> Result<(StatusCode, Json<BorrowerResponse>), ApiError> {
    let borrower = state
        .service_deps
        .borrowers
        .create(req.into_borrower())
        .await
        .map_err(ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(BorrowerResponse::from(borrower))))
}

/// POST /books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = state
        .service_deps
        .books
        .create(req.into_book())
        .await
        .map_err(ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// POST /branches - 分館を登録
pub async fn create_branch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBranchRequest>,
) -> Result<(StatusCode, Json<BranchResponse>), ApiError> {
    let branch = state
        .service_deps
        .branches
        .create(req.into_branch())
        .await
        .map_err(ApiError::Internal)?;

    Ok((StatusCode::CREATED, Json(BranchResponse::from(branch))))
}

// ============================================================================
// Copy inventory handlers
// ============================================================================

/// PUT /branches/:branch_id/books/:book_id/copies - 貸出可能冊数を設定
pub async fn set_copies(
    State(state): State<Arc<AppState>>,
    Path((branch_id, book_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SetCopiesRequest>,
) -> Result<Json<CopiesResponse>, ApiError> {
    let deps = &state.service_deps;
    let branch_id = BranchId::from_uuid(branch_id);
    let book_id = BookId::from_uuid(book_id);

    let Some(copies) = req.to_copy_count() else {
        return Err(ApiError::InvalidRequest(format!(
            "copies must not exceed {}",
            MAX_COPIES
        )));
    };

    // 分館と書籍の存在確認
    let branch = deps
        .branches
        .find_by_id(branch_id)
        .await
        .map_err(ApiError::Internal)?;
    if branch.is_none() {
        return Err(BorrowingApplicationError::BranchNotFound.into());
    }

    let book = deps
        .books
        .find_by_id(book_id)
        .await
        .map_err(ApiError::Internal)?;
    if book.is_none() {
        return Err(BorrowingApplicationError::BookNotFound.into());
    }

    let mut uow = borrowing::begin(deps).await?;
    uow.copies()
        .set_copies(branch_id, book_id, copies)
        .await
        .map_err(ApiError::Internal)?;
    borrowing::commit(uow).await?;

    Ok(Json(CopiesResponse {
        branch_id: branch_id.value(),
        book_id: book_id.value(),
        copies: copies.value(),
    }))
}

/// GET /branches/:branch_id/books/:book_id/copies - 貸出可能冊数を取得
pub async fn get_copies(
    State(state): State<Arc<AppState>>,
    Path((branch_id, book_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CopiesResponse>, ApiError> {
    let branch_id = BranchId::from_uuid(branch_id);
    let book_id = BookId::from_uuid(book_id);

    // 読み取りのみ（commitせずに破棄）
    let mut uow = borrowing::begin(&state.service_deps).await?;
    let copies = uow
        .copies()
        .get_copies(branch_id, book_id)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(CopiesResponse {
        branch_id: branch_id.value(),
        book_id: book_id.value(),
        copies: copies.value(),
    }))
}

// ============================================================================
// Loan handlers
// ============================================================================

/// POST /loans - 書籍を借りる
///
/// 1リクエスト = 1作業単位。成功時のみcommitする。
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowBookRequest>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let deps = &state.service_deps;
    let cmd = req.to_command(Utc::now());

    let mut uow = borrowing::begin(deps).await?;
    let outcome = execute_borrow_book(deps, &mut *uow, cmd).await?;

    let Some(loan) = outcome.into_loan() else {
        return Err(ApiError::NoCopiesAvailable);
    };

    borrowing::commit(uow).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// POST /loans/return - 書籍を返却する
///
/// 延滞していても返却は受け付ける。`was_overdue`で延滞の有無を返す。
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnBookRequest>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    let cmd = req.to_command(Utc::now().date_naive());

    let mut uow = borrowing::begin(&state.service_deps).await?;
    let outcome = execute_return_book(&mut *uow, cmd).await?;

    let Some(response) = BookReturnedResponse::from_outcome(&outcome) else {
        return Err(ApiError::NoActiveLoan);
    };

    borrowing::commit(uow).await?;

    Ok(Json(response))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /borrowers/:borrower_id/loans - 利用者の貸出中の記録
pub async fn list_borrowed_books(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<Uuid>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let mut uow = borrowing::begin(&state.service_deps).await?;
    let loans = execute_borrowed_books(&mut *uow, BorrowerId::from_uuid(borrower_id)).await?;

    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

/// GET /borrowers/:borrower_id/branches - 利用者が貸出中の分館
pub async fn list_branches_with_loans(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<Uuid>,
) -> Result<Json<Vec<BranchResponse>>, ApiError> {
    let deps = &state.service_deps;

    let mut uow = borrowing::begin(deps).await?;
    let branches =
        execute_branches_with_loans(deps, &mut *uow, BorrowerId::from_uuid(borrower_id))
            .await?;

    Ok(Json(branches.into_iter().map(BranchResponse::from).collect()))
}
