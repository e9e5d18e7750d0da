use crate::domain::{
    loan::Loan,
    value_objects::{BookId, BorrowerId, BranchId, CopyCount, LoanKey},
};
use crate::ports::copy_inventory::CopyInventory;
use crate::ports::loan_records::LoanRecords;
use crate::ports::unit_of_work::{
    Result, TransactionManager as TransactionManagerTrait, UnitOfWork as UnitOfWorkTrait,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::error::InMemoryStoreError;

type CopyPair = (BranchId, BookId);

/// コミット済みの状態
///
/// `versions`は (分館, 書籍) ごとの冊数がcommitで書き換えられた回数。
#[derive(Debug, Default)]
struct CommittedState {
    copies: HashMap<CopyPair, CopyCount>,
    versions: HashMap<CopyPair, u64>,
    loans: BTreeMap<LoanKey, Loan>,
}

impl CommittedState {
    fn version(&self, pair: &CopyPair) -> u64 {
        self.versions.get(pair).copied().unwrap_or(0)
    }
}

fn lock(
    state: &Mutex<CommittedState>,
) -> std::result::Result<MutexGuard<'_, CommittedState>, InMemoryStoreError> {
    state.lock().map_err(|_| InMemoryStoreError::LockPoisoned)
}

/// TransactionManagerのインメモリ実装
///
/// コミット済みの状態を共有し、作業単位ごとに変更をステージする。テスト用。
///
/// 作業単位は最初に触れた (分館, 書籍) の版を記録する。commit時に他の作業単位が
/// 先に同じ組の冊数をcommitしていれば`WriteConflict`で失敗し、何も反映しない。
#[derive(Clone, Default)]
pub struct TransactionManager {
    state: Arc<Mutex<CommittedState>>,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 作業単位の外からコミット済みの冊数を読む
    pub fn committed_copies(&self, branch_id: BranchId, book_id: BookId) -> Result<CopyCount> {
        let state = lock(&self.state)?;
        Ok(state
            .copies
            .get(&(branch_id, book_id))
            .copied()
            .unwrap_or_default())
    }

    /// 作業単位の外からコミット済みの貸出件数を読む
    pub fn committed_loan_count(&self) -> Result<usize> {
        let state = lock(&self.state)?;
        Ok(state.loans.len())
    }
}

#[async_trait]
impl TransactionManagerTrait for TransactionManager {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>> {
        Ok(Box::new(UnitOfWork {
            state: Arc::clone(&self.state),
            observed_versions: HashMap::new(),
            staged_copies: HashMap::new(),
            staged_loans: BTreeMap::new(),
        }))
    }
}

/// UnitOfWorkのインメモリ実装
///
/// 読み取りはステージされた変更を優先し、なければコミット済みの状態を参照する。
/// `staged_loans`の`None`は削除を表す。
pub struct UnitOfWork {
    state: Arc<Mutex<CommittedState>>,
    observed_versions: HashMap<CopyPair, u64>,
    staged_copies: HashMap<CopyPair, CopyCount>,
    staged_loans: BTreeMap<LoanKey, Option<Loan>>,
}

impl UnitOfWork {
    fn visible_loan(&self, key: LoanKey) -> Result<Option<Loan>> {
        if let Some(staged) = self.staged_loans.get(&key) {
            return Ok(staged.clone());
        }

        let state = lock(&self.state)?;
        Ok(state.loans.get(&key).cloned())
    }
}

#[async_trait]
impl CopyInventory for UnitOfWork {
    async fn get_copies(
        &mut self,
        branch_id: BranchId,
        book_id: BookId,
    ) -> crate::ports::copy_inventory::Result<CopyCount> {
        let pair = (branch_id, book_id);
        if let Some(copies) = self.staged_copies.get(&pair) {
            return Ok(*copies);
        }

        let state = lock(&self.state)?;
        self.observed_versions
            .entry(pair)
            .or_insert_with(|| state.version(&pair));
        Ok(state.copies.get(&pair).copied().unwrap_or_default())
    }

    async fn set_copies(
        &mut self,
        branch_id: BranchId,
        book_id: BookId,
        copies: CopyCount,
    ) -> crate::ports::copy_inventory::Result<()> {
        let pair = (branch_id, book_id);
        if !self.observed_versions.contains_key(&pair) {
            let state = lock(&self.state)?;
            self.observed_versions.insert(pair, state.version(&pair));
        }

        self.staged_copies.insert(pair, copies);
        Ok(())
    }
}

#[async_trait]
impl LoanRecords for UnitOfWork {
    async fn create(&mut self, loan: Loan) -> crate::ports::loan_records::Result<Loan> {
        let key = loan.key();

        if self.visible_loan(key)?.is_some() {
            return Err(Box::new(InMemoryStoreError::DuplicateLoan {
                borrower_id: key.borrower_id.value().to_string(),
                book_id: key.book_id.value().to_string(),
                branch_id: key.branch_id.value().to_string(),
            }));
        }

        self.staged_loans.insert(key, Some(loan.clone()));
        Ok(loan)
    }

    async fn find_active(
        &mut self,
        key: LoanKey,
    ) -> crate::ports::loan_records::Result<Option<Loan>> {
        self.visible_loan(key)
    }

    async fn find_all_by_borrower(
        &mut self,
        borrower_id: BorrowerId,
    ) -> crate::ports::loan_records::Result<Vec<Loan>> {
        let mut visible: BTreeMap<LoanKey, Loan> = {
            let state = lock(&self.state)?;
            state
                .loans
                .iter()
                .filter(|(key, _)| key.borrower_id == borrower_id)
                .map(|(key, loan)| (*key, loan.clone()))
                .collect()
        };

        for (key, staged) in self
            .staged_loans
            .iter()
            .filter(|(key, _)| key.borrower_id == borrower_id)
        {
            match staged {
                Some(loan) => {
                    visible.insert(*key, loan.clone());
                }
                None => {
                    visible.remove(key);
                }
            }
        }

        let mut loans: Vec<Loan> = visible.into_values().collect();
        loans.sort_by(|a, b| {
            a.borrowed_at
                .cmp(&b.borrowed_at)
                .then_with(|| a.key().cmp(&b.key()))
        });
        Ok(loans)
    }

    async fn delete(&mut self, loan: &Loan) -> crate::ports::loan_records::Result<()> {
        let key = loan.key();

        if self.visible_loan(key)?.is_none() {
            return Err(Box::new(InMemoryStoreError::LoanNotFound {
                borrower_id: key.borrower_id.value().to_string(),
                book_id: key.book_id.value().to_string(),
                branch_id: key.branch_id.value().to_string(),
            }));
        }

        self.staged_loans.insert(key, None);
        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    fn copies(&mut self) -> &mut dyn CopyInventory {
        self
    }

    fn loans(&mut self) -> &mut dyn LoanRecords {
        self
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let UnitOfWork {
            state: shared,
            observed_versions,
            staged_copies,
            staged_loans,
        } = *self;

        let mut state = lock(&shared)?;

        // 反映前にすべての組の版を確認する
        for pair in staged_copies.keys() {
            let observed = observed_versions.get(pair).copied().unwrap_or(0);
            if state.version(pair) != observed {
                return Err(Box::new(InMemoryStoreError::WriteConflict {
                    branch_id: pair.0.value().to_string(),
                    book_id: pair.1.value().to_string(),
                }));
            }
        }

        for (pair, copies) in staged_copies {
            state.copies.insert(pair, copies);
            *state.versions.entry(pair).or_insert(0) += 1;
        }

        for (key, staged) in staged_loans {
            match staged {
                Some(loan) => {
                    state.loans.insert(key, loan);
                }
                None => {
                    state.loans.remove(&key);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_loan(key: LoanKey) -> Loan {
        let now = Utc::now();
        Loan {
            borrower_id: key.borrower_id,
            book_id: key.book_id,
            branch_id: key.branch_id,
            borrowed_at: now,
            due_date: (now + Duration::days(14)).date_naive(),
            returned_on: None,
        }
    }

    fn sample_key() -> LoanKey {
        LoanKey::new(BorrowerId::new(), BookId::new(), BranchId::new())
    }

    #[tokio::test]
    async fn test_unknown_pair_reads_zero() {
        let manager = TransactionManager::new();
        let mut uow = manager.begin().await.unwrap();

        let copies = uow
            .copies()
            .get_copies(BranchId::new(), BookId::new())
            .await
            .unwrap();
        assert_eq!(copies, CopyCount::ZERO);
    }

    #[tokio::test]
    async fn test_read_your_writes() {
        let manager = TransactionManager::new();
        let branch_id = BranchId::new();
        let book_id = BookId::new();
        let key = sample_key();

        let mut uow = manager.begin().await.unwrap();
        uow.copies()
            .set_copies(branch_id, book_id, CopyCount::new(7))
            .await
            .unwrap();
        uow.loans().create(sample_loan(key)).await.unwrap();

        assert_eq!(
            uow.copies().get_copies(branch_id, book_id).await.unwrap(),
            CopyCount::new(7)
        );
        assert!(uow.loans().find_active(key).await.unwrap().is_some());

        // コミット前は外から見えない
        assert_eq!(
            manager.committed_copies(branch_id, book_id).unwrap(),
            CopyCount::ZERO
        );
        assert_eq!(manager.committed_loan_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_commit_makes_changes_durable() {
        let manager = TransactionManager::new();
        let branch_id = BranchId::new();
        let book_id = BookId::new();
        let key = sample_key();

        let mut uow = manager.begin().await.unwrap();
        uow.copies()
            .set_copies(branch_id, book_id, CopyCount::new(3))
            .await
            .unwrap();
        uow.loans().create(sample_loan(key)).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(
            manager.committed_copies(branch_id, book_id).unwrap(),
            CopyCount::new(3)
        );
        assert_eq!(manager.committed_loan_count().unwrap(), 1);

        let mut next = manager.begin().await.unwrap();
        assert!(next.loans().find_active(key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards_changes() {
        let manager = TransactionManager::new();
        let branch_id = BranchId::new();
        let book_id = BookId::new();

        {
            let mut uow = manager.begin().await.unwrap();
            uow.copies()
                .set_copies(branch_id, book_id, CopyCount::new(5))
                .await
                .unwrap();
            uow.loans().create(sample_loan(sample_key())).await.unwrap();
        }

        assert_eq!(
            manager.committed_copies(branch_id, book_id).unwrap(),
            CopyCount::ZERO
        );
        assert_eq!(manager.committed_loan_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_loan_is_rejected() {
        let manager = TransactionManager::new();
        let key = sample_key();

        let mut uow = manager.begin().await.unwrap();
        uow.loans().create(sample_loan(key)).await.unwrap();
        let result = uow.loans().create(sample_loan(key)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete_then_find_all_by_borrower() {
        let manager = TransactionManager::new();
        let borrower_id = BorrowerId::new();
        let first = LoanKey::new(borrower_id, BookId::new(), BranchId::new());
        let second = LoanKey::new(borrower_id, BookId::new(), BranchId::new());

        let mut uow = manager.begin().await.unwrap();
        uow.loans().create(sample_loan(first)).await.unwrap();
        uow.loans().create(sample_loan(second)).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = manager.begin().await.unwrap();
        let loan = uow.loans().find_active(first).await.unwrap().unwrap();
        uow.loans().delete(&loan).await.unwrap();

        let remaining = uow.loans().find_all_by_borrower(borrower_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].key(), second);

        // 他の利用者の貸出は含まれない
        let other = uow
            .loans()
            .find_all_by_borrower(BorrowerId::new())
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_loan_is_rejected() {
        let manager = TransactionManager::new();
        let mut uow = manager.begin().await.unwrap();

        let result = uow.loans().delete(&sample_loan(sample_key())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_interleaved_commit_on_same_pair_conflicts() {
        let manager = TransactionManager::new();
        let branch_id = BranchId::new();
        let book_id = BookId::new();

        let mut setup = manager.begin().await.unwrap();
        setup
            .copies()
            .set_copies(branch_id, book_id, CopyCount::new(2))
            .await
            .unwrap();
        setup.commit().await.unwrap();

        // 2つの作業単位が同じ冊数を読んでから減らす
        let mut first = manager.begin().await.unwrap();
        let mut second = manager.begin().await.unwrap();
        for uow in [&mut first, &mut second] {
            let copies = uow.copies().get_copies(branch_id, book_id).await.unwrap();
            uow.copies()
                .set_copies(branch_id, book_id, copies.decrement().unwrap())
                .await
                .unwrap();
            let key = LoanKey::new(BorrowerId::new(), book_id, branch_id);
            uow.loans().create(sample_loan(key)).await.unwrap();
        }

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(result.is_err());
        assert_eq!(
            manager.committed_copies(branch_id, book_id).unwrap(),
            CopyCount::new(1)
        );
        assert_eq!(manager.committed_loan_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sequential_units_do_not_conflict() {
        let manager = TransactionManager::new();
        let branch_id = BranchId::new();
        let book_id = BookId::new();

        for expected in 1..=3 {
            let mut uow = manager.begin().await.unwrap();
            let copies = uow.copies().get_copies(branch_id, book_id).await.unwrap();
            uow.copies()
                .set_copies(branch_id, book_id, copies.increment().unwrap())
                .await
                .unwrap();
            uow.commit().await.unwrap();

            assert_eq!(
                manager.committed_copies(branch_id, book_id).unwrap(),
                CopyCount::new(expected)
            );
        }
    }
}
