use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowBookError, BorrowerId, BranchId, CopyCount, LoanKey, ReturnBookError};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loan集約 - ある分館のある書籍1冊の、ある利用者への1回の貸出
///
/// 返却されると記録そのものが削除される（返却済みフラグは持たない）。
/// `returned_on`は返却処理の結果としてのみ設定される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    // 他の集約への参照（IDのみ）
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
    pub branch_id: BranchId,

    // 貸出管理の責務
    pub borrowed_at: DateTime<Utc>,
    pub due_date: NaiveDate,
    pub returned_on: Option<NaiveDate>,
}

impl Loan {
    /// 識別子（利用者, 書籍, 分館）
    pub fn key(&self) -> LoanKey {
        LoanKey::new(self.borrower_id, self.book_id, self.branch_id)
    }
}

/// 返却済みの貸出
///
/// 返却は期限前・当日・期限後のいずれでも受け付ける。
/// 延滞かどうかは情報として保持するだけで、受付結果は変わらない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedLoan {
    pub loan: Loan,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
}

/// 貸出日から標準の返却期限を計算する
pub fn default_due_date(borrowed_at: DateTime<Utc>) -> NaiveDate {
    (borrowed_at + Duration::days(LOAN_PERIOD_DAYS)).date_naive()
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出可能冊数が0なら貸し出せない
/// - 貸出ごとに冊数はちょうど1減る
///
/// 副作用なし。新しいLoanと更新後の冊数を返す。
pub fn borrow_book(
    key: LoanKey,
    available: CopyCount,
    borrowed_at: DateTime<Utc>,
    due_date: NaiveDate,
) -> Result<(Loan, CopyCount), BorrowBookError> {
    if !available.is_available() {
        return Err(BorrowBookError::NoCopiesAvailable);
    }

    let remaining = available.decrement()?;

    let loan = Loan {
        borrower_id: key.borrower_id,
        book_id: key.book_id,
        branch_id: key.branch_id,
        borrowed_at,
        due_date,
        returned_on: None,
    };

    Ok((loan, remaining))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 延滞していても返却は受け付ける
/// - 延滞料金なし
/// - 返却ごとに冊数はちょうど1増える
///
/// 副作用なし。返却済みの貸出と更新後の冊数を返す。
pub fn return_book(
    loan: Loan,
    available: CopyCount,
    returned_on: NaiveDate,
) -> Result<(ReturnedLoan, CopyCount), ReturnBookError> {
    let restored = available.increment()?;
    let was_overdue = is_overdue(&loan, returned_on);

    let returned = ReturnedLoan {
        loan: Loan {
            returned_on: Some(returned_on),
            ..loan
        },
        returned_on,
        was_overdue,
    };

    Ok((returned, restored))
}

/// 純粋関数：延滞判定
///
/// 返却期限の翌日以降は延滞。
pub fn is_overdue(loan: &Loan, on: NaiveDate) -> bool {
    on > loan.due_date
}
