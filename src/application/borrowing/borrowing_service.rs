use crate::domain::{
    self, BorrowBookError,
    commands::*,
    entities::Branch,
    loan::{Loan, ReturnedLoan},
    value_objects::*,
};
use crate::ports::*;
use std::collections::HashSet;
use std::sync::Arc;

use super::errors::{BorrowingApplicationError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
///
/// 作業単位（UnitOfWork）は依存関係には含めず、各操作の引数として明示的に渡す。
/// トランザクション境界の所有者が型シグネチャから読み取れるようにするため。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub transactions: Arc<dyn TransactionManager>,
    pub borrowers: Arc<dyn BorrowerRepository>,
    pub books: Arc<dyn BookRepository>,
    pub branches: Arc<dyn BranchRepository>,
}

/// 貸出の結果
///
/// 冊数が0の場合は`Unavailable`。エラーではなく、呼び出し側が分岐すべき通常の結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    Borrowed(Loan),
    Unavailable,
}

impl BorrowOutcome {
    pub fn loan(&self) -> Option<&Loan> {
        match self {
            BorrowOutcome::Borrowed(loan) => Some(loan),
            BorrowOutcome::Unavailable => None,
        }
    }

    pub fn into_loan(self) -> Option<Loan> {
        match self {
            BorrowOutcome::Borrowed(loan) => Some(loan),
            BorrowOutcome::Unavailable => None,
        }
    }
}

/// 返却の結果
///
/// 該当する貸出がない場合は`NoActiveLoan`。
/// 同じ貸出を2回返却すると、2回目は`NoActiveLoan`になる（冊数は増えない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    Returned(ReturnedLoan),
    NoActiveLoan,
}

impl ReturnOutcome {
    /// 返却が受け付けられたか
    ///
    /// 延滞の有無にかかわらず、貸出が存在すれば常にtrue。
    pub fn is_accepted(&self) -> bool {
        matches!(self, ReturnOutcome::Returned(_))
    }

    pub fn returned(&self) -> Option<&ReturnedLoan> {
        match self {
            ReturnOutcome::Returned(returned) => Some(returned),
            ReturnOutcome::NoActiveLoan => None,
        }
    }
}

/// 作業単位を開始する
pub async fn begin(deps: &ServiceDependencies) -> Result<Box<dyn UnitOfWork>> {
    deps.transactions
        .begin()
        .await
        .map_err(BorrowingApplicationError::TransactionError)
}

/// 作業単位をcommitする
///
/// 前回のcommit以降にステージされたすべての変更を永続化する。
/// 失敗した場合、何も永続化されない。
pub async fn commit(uow: Box<dyn UnitOfWork>) -> Result<()> {
    uow.commit()
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    tracing::debug!("Unit of work committed");
    Ok(())
}

/// 利用者・書籍・分館が存在することを確認するヘルパー関数
async fn ensure_references_exist(deps: &ServiceDependencies, cmd: &BorrowBook) -> Result<()> {
    let borrower = deps
        .borrowers
        .find_by_id(cmd.borrower_id)
        .await
        .map_err(BorrowingApplicationError::DirectoryError)?;
    if borrower.is_none() {
        return Err(BorrowingApplicationError::BorrowerNotFound);
    }

    let book = deps
        .books
        .find_by_id(cmd.book_id)
        .await
        .map_err(BorrowingApplicationError::DirectoryError)?;
    if book.is_none() {
        return Err(BorrowingApplicationError::BookNotFound);
    }

    let branch = deps
        .branches
        .find_by_id(cmd.branch_id)
        .await
        .map_err(BorrowingApplicationError::DirectoryError)?;
    if branch.is_none() {
        return Err(BorrowingApplicationError::BranchNotFound);
    }

    Ok(())
}

/// 書籍を借りる
///
/// ビジネスルール：
/// - 利用者・書籍・分館が存在すること
/// - (分館, 書籍) の貸出可能冊数が1以上であること
/// - 貸出ごとに冊数はちょうど1減る
///
/// 冊数の減算と貸出記録の作成は同じ作業単位にステージされ、
/// `commit()`が呼ばれるまで永続化されない。
///
/// 同じ (利用者, 書籍, 分館) の貸出が既に存在するかは確認しない。
/// 一意性は貸出記録ストアが保証し、違反は`TransactionError`になる。
///
/// # 戻り値
/// - `Borrowed(loan)`: 貸出成功
/// - `Unavailable`: 冊数が0（状態は変更しない）
pub async fn borrow_book(
    deps: &ServiceDependencies,
    uow: &mut dyn UnitOfWork,
    cmd: BorrowBook,
) -> Result<BorrowOutcome> {
    // 1. 参照の存在確認
    ensure_references_exist(deps, &cmd).await?;

    // 2. 現在の冊数を取得
    let available = uow
        .copies()
        .get_copies(cmd.branch_id, cmd.book_id)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let (loan, remaining) =
        match domain::loan::borrow_book(cmd.key(), available, cmd.borrowed_at, cmd.due_date) {
            Ok(result) => result,
            Err(BorrowBookError::NoCopiesAvailable) => {
                tracing::debug!(
                    branch_id = %cmd.branch_id.value(),
                    book_id = %cmd.book_id.value(),
                    "No copies available"
                );
                return Ok(BorrowOutcome::Unavailable);
            }
        };

    // 4. 冊数を更新
    uow.copies()
        .set_copies(cmd.branch_id, cmd.book_id, remaining)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    // 5. 貸出記録を作成
    let loan = uow
        .loans()
        .create(loan)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    tracing::info!(
        borrower_id = %loan.borrower_id.value(),
        book_id = %loan.book_id.value(),
        branch_id = %loan.branch_id.value(),
        due_date = %loan.due_date,
        remaining = remaining.value(),
        "Book borrowed"
    );

    Ok(BorrowOutcome::Borrowed(loan))
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出が存在すること（存在しなければ`NoActiveLoan`、状態は変更しない）
/// - 延滞していても返却は受け付ける（延滞料金なし）
/// - 貸出記録は削除され、冊数はちょうど1増える
///
/// 参照（利用者・書籍・分館）の存在は確認しない。存在しない参照には貸出もない。
pub async fn return_book(uow: &mut dyn UnitOfWork, cmd: ReturnBook) -> Result<ReturnOutcome> {
    // 1. 貸出中の記録を取得
    let loan = uow
        .loans()
        .find_active(cmd.key())
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    let Some(loan) = loan else {
        tracing::debug!(
            borrower_id = %cmd.borrower_id.value(),
            book_id = %cmd.book_id.value(),
            branch_id = %cmd.branch_id.value(),
            "No active loan to return"
        );
        return Ok(ReturnOutcome::NoActiveLoan);
    };

    // 2. 現在の冊数を取得
    let available = uow
        .copies()
        .get_copies(cmd.branch_id, cmd.book_id)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let (returned, restored) = domain::loan::return_book(loan, available, cmd.returned_on)
        .map_err(|e| BorrowingApplicationError::DomainError(format!("{:?}", e)))?;

    // 4. 貸出記録を削除
    uow.loans()
        .delete(&returned.loan)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    // 5. 冊数を更新
    uow.copies()
        .set_copies(cmd.branch_id, cmd.book_id, restored)
        .await
        .map_err(BorrowingApplicationError::TransactionError)?;

    tracing::info!(
        borrower_id = %cmd.borrower_id.value(),
        book_id = %cmd.book_id.value(),
        branch_id = %cmd.branch_id.value(),
        was_overdue = returned.was_overdue,
        "Book returned"
    );

    Ok(ReturnOutcome::Returned(returned))
}

/// 利用者の貸出中の記録をすべて取得する
pub async fn borrowed_books(uow: &mut dyn UnitOfWork, borrower_id: BorrowerId) -> Result<Vec<Loan>> {
    uow.loans()
        .find_all_by_borrower(borrower_id)
        .await
        .map_err(BorrowingApplicationError::TransactionError)
}

/// 利用者が貸出中の記録を持つ分館を取得する
///
/// 同じ分館で複数冊借りていても、分館は1回だけ含まれる。
/// 順序は各分館の最初の貸出の順。
pub async fn branches_with_loans(
    deps: &ServiceDependencies,
    uow: &mut dyn UnitOfWork,
    borrower_id: BorrowerId,
) -> Result<Vec<Branch>> {
    let loans = borrowed_books(uow, borrower_id).await?;

    let mut seen = HashSet::new();
    let mut branches = Vec::new();

    for loan in loans {
        if !seen.insert(loan.branch_id) {
            continue;
        }

        let branch = deps
            .branches
            .find_by_id(loan.branch_id)
            .await
            .map_err(BorrowingApplicationError::DirectoryError)?;

        match branch {
            Some(branch) => branches.push(branch),
            None => tracing::warn!(
                branch_id = %loan.branch_id.value(),
                "Loan references a branch that no longer exists"
            ),
        }
    }

    Ok(branches)
}
