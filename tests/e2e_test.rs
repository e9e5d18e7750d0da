use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use rusty_library_loans::adapters::memory;
use rusty_library_loans::api::handlers::AppState;
use rusty_library_loans::api::router::create_router;
use rusty_library_loans::api::types::*;
use rusty_library_loans::application::borrowing::ServiceDependencies;
use rusty_library_loans::ports::{TransactionManager, UnitOfWork, unit_of_work};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// インメモリアダプターでアプリケーションを組み立てる
fn setup_e2e_app() -> axum::Router {
    let service_deps = ServiceDependencies {
        transactions: Arc::new(memory::TransactionManager::new()),
        borrowers: Arc::new(memory::BorrowerRepository::new()),
        books: Arc::new(memory::BookRepository::new()),
        branches: Arc::new(memory::BranchRepository::new()),
    };

    create_router(Arc::new(AppState { service_deps }))
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// 利用者・書籍・分館を登録し、蔵書数を設定する
async fn setup_library(app: &axum::Router, copies: u32) -> (Uuid, Uuid, Uuid) {
    let response = send(
        app,
        "POST",
        "/borrowers",
        Some(json!({
            "name": "The Borrower Name",
            "address": "650 New Jersey Ave, Washington, DC 20001",
            "phone": "1234567890",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let borrower: BorrowerResponse = read_json(response).await;

    let response = send(
        app,
        "POST",
        "/books",
        Some(json!({ "title": "The Book Title", "author": "An Author" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let book: BookResponse = read_json(response).await;
    assert_eq!(book.author.as_deref(), Some("An Author"));
    assert_eq!(book.publisher, None);

    let response = send(
        app,
        "POST",
        "/branches",
        Some(json!({
            "name": "The Branch Name",
            "address": "601 New Jersey Ave, Washington, DC 20001",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let branch: BranchResponse = read_json(response).await;

    let response = send(
        app,
        "PUT",
        &copies_uri(branch.branch_id, book.book_id),
        Some(json!({ "copies": copies })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    (borrower.borrower_id, book.book_id, branch.branch_id)
}

fn copies_uri(branch_id: Uuid, book_id: Uuid) -> String {
    format!("/branches/{}/books/{}/copies", branch_id, book_id)
}

async fn current_copies(app: &axum::Router, branch_id: Uuid, book_id: Uuid) -> u32 {
    let response = send(app, "GET", &copies_uri(branch_id, book_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let copies: CopiesResponse = read_json(response).await;
    copies.copies
}

// ============================================================================
// E2Eテスト: 正常系
// ============================================================================

#[tokio::test]
async fn test_e2e_health_check() {
    let app = setup_e2e_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_e2e_full_borrowing_flow() {
    // Arrange
    let app = setup_e2e_app();
    let (borrower_id, book_id, branch_id) = setup_library(&app, 50).await;

    // Step 1: 貸出（POST /loans）
    let response = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
            "borrowed_at": "2026-10-01T10:00:00Z",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let loan: LoanResponse = read_json(response).await;
    assert_eq!(loan.borrower_id, borrower_id);
    // 返却期限の省略時は14日後
    assert_eq!(loan.due_date.to_string(), "2026-10-15");
    assert_eq!(current_copies(&app, branch_id, book_id).await, 49);

    // Step 2: 貸出中の書籍（GET /borrowers/:id/loans）
    let response = send(&app, "GET", &format!("/borrowers/{}/loans", borrower_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let loans: Vec<LoanResponse> = read_json(response).await;
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].book_id, book_id);

    // Step 3: 貸出中の分館（GET /borrowers/:id/branches）
    let response = send(
        &app,
        "GET",
        &format!("/borrowers/{}/branches", borrower_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let branches: Vec<BranchResponse> = read_json(response).await;
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].branch_id, branch_id);

    // Step 4: 返却（POST /loans/return）
    let response = send(
        &app,
        "POST",
        "/loans/return",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
            "returned_on": "2026-10-08",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let returned: BookReturnedResponse = read_json(response).await;
    assert!(returned.accepted);
    assert!(!returned.was_overdue);
    assert_eq!(current_copies(&app, branch_id, book_id).await, 50);

    // Step 5: 返却後は貸出中の書籍なし
    let response = send(&app, "GET", &format!("/borrowers/{}/loans", borrower_id), None).await;
    let loans: Vec<LoanResponse> = read_json(response).await;
    assert!(loans.is_empty());
}

#[tokio::test]
async fn test_e2e_late_return_is_accepted() {
    let app = setup_e2e_app();
    let (borrower_id, book_id, branch_id) = setup_library(&app, 1).await;

    let response = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
            "borrowed_at": "2026-10-01T10:00:00Z",
            "due_date": "2026-10-05",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        "POST",
        "/loans/return",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
            "returned_on": "2026-10-20",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let returned: BookReturnedResponse = read_json(response).await;
    assert!(returned.accepted);
    assert!(returned.was_overdue);
    assert_eq!(current_copies(&app, branch_id, book_id).await, 1);
}

#[tokio::test]
async fn test_e2e_unknown_copies_read_as_zero() {
    let app = setup_e2e_app();

    let copies = current_copies(&app, Uuid::new_v4(), Uuid::new_v4()).await;

    assert_eq!(copies, 0);
}

// ============================================================================
// E2Eテスト: エラーケース
// ============================================================================

#[tokio::test]
async fn test_e2e_borrow_no_copies_available() {
    // Arrange
    let app = setup_e2e_app();
    let (borrower_id, book_id, branch_id) = setup_library(&app, 0).await;

    // Act
    let response = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
        })),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "NO_COPIES_AVAILABLE");
    assert_eq!(current_copies(&app, branch_id, book_id).await, 0);
}

#[tokio::test]
async fn test_e2e_borrow_borrower_not_found() {
    // Arrange
    let app = setup_e2e_app();
    let (_, book_id, branch_id) = setup_library(&app, 5).await;

    // Act: 存在しない利用者IDで貸出を試みる
    let response = send(
        &app,
        "POST",
        "/loans",
        Some(json!({
            "borrower_id": Uuid::new_v4(),
            "book_id": book_id,
            "branch_id": branch_id,
        })),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BORROWER_NOT_FOUND");
    assert!(error.message.contains("Borrower not found"));
    assert_eq!(current_copies(&app, branch_id, book_id).await, 5);
}

#[tokio::test]
async fn test_e2e_return_without_loan() {
    // Arrange
    let app = setup_e2e_app();
    let (borrower_id, book_id, branch_id) = setup_library(&app, 5).await;

    // Act: 借りていない書籍を返却する
    let response = send(
        &app,
        "POST",
        "/loans/return",
        Some(json!({
            "borrower_id": borrower_id,
            "book_id": book_id,
            "branch_id": branch_id,
        })),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "NO_ACTIVE_LOAN");
    assert_eq!(current_copies(&app, branch_id, book_id).await, 5);
}

#[tokio::test]
async fn test_e2e_set_copies_unknown_branch() {
    let app = setup_e2e_app();
    let (_, book_id, _) = setup_library(&app, 5).await;

    let response = send(
        &app,
        "PUT",
        &copies_uri(Uuid::new_v4(), book_id),
        Some(json!({ "copies": 3 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BRANCH_NOT_FOUND");
}

#[tokio::test]
async fn test_e2e_set_copies_above_column_range() {
    // Arrange
    let app = setup_e2e_app();
    let (_, book_id, branch_id) = setup_library(&app, 5).await;

    // Act: INTEGER列に収まらない冊数
    let response = send(
        &app,
        "PUT",
        &copies_uri(branch_id, book_id),
        Some(json!({ "copies": 3_000_000_000u32 })),
    )
    .await;

    // Assert
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "INVALID_REQUEST");
    assert_eq!(current_copies(&app, branch_id, book_id).await, 5);
}

/// トランザクションを開始できないストア
struct UnavailableTransactionManager;

#[async_trait::async_trait]
impl TransactionManager for UnavailableTransactionManager {
    async fn begin(&self) -> unit_of_work::Result<Box<dyn UnitOfWork>> {
        Err("database is unavailable".into())
    }
}

#[tokio::test]
async fn test_e2e_storage_failure_is_internal_error() {
    // Arrange
    let service_deps = ServiceDependencies {
        transactions: Arc::new(UnavailableTransactionManager),
        borrowers: Arc::new(memory::BorrowerRepository::new()),
        books: Arc::new(memory::BookRepository::new()),
        branches: Arc::new(memory::BranchRepository::new()),
    };
    let app = create_router(Arc::new(AppState { service_deps }));

    // Act
    let response = send(
        &app,
        "GET",
        &format!("/borrowers/{}/loans", Uuid::new_v4()),
        None,
    )
    .await;

    // Assert: 内部エラーの詳細はクライアントに返さない
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "TRANSACTION_ERROR");
    assert!(!error.message.contains("database is unavailable"));
}
