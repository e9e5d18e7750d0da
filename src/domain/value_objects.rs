use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 利用者ID - 利用者管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BorrowerId(Uuid);

impl BorrowerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BorrowerId {
    fn default() -> Self {
        Self::new()
    }
}

/// 書籍ID - カタログ管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// 分館ID - 分館管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(Uuid);

impl BranchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出キー
///
/// 貸出の識別子は (利用者, 書籍, 分館) の組。
/// 同じ組に対して同時に存在できる貸出は1件まで。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoanKey {
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
    pub branch_id: BranchId,
}

impl LoanKey {
    pub fn new(borrower_id: BorrowerId, book_id: BookId, branch_id: BranchId) -> Self {
        Self {
            borrower_id,
            book_id,
            branch_id,
        }
    }
}

/// 蔵書数エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyCountError {
    /// 貸出可能な冊数が0
    Exhausted,
    /// 上限を超えた
    Overflow,
    /// 負の値からは作れない
    Negative,
}

/// 貸出可能冊数
///
/// 不変条件：負の値にならない。
/// 型（u32）でこの制約を強制し、0からの減算はエラーとして扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CopyCount(u32);

impl CopyCount {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// 1冊減らす（貸出時）
    ///
    /// # エラー
    /// 既に0の場合は`CopyCountError::Exhausted`を返す
    pub fn decrement(self) -> Result<Self, CopyCountError> {
        self.0
            .checked_sub(1)
            .map(Self)
            .ok_or(CopyCountError::Exhausted)
    }

    /// 1冊増やす（返却時）
    pub fn increment(self) -> Result<Self, CopyCountError> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or(CopyCountError::Overflow)
    }

    /// 現在の冊数
    pub fn value(&self) -> u32 {
        self.0
    }

    /// 貸出可能か（1冊以上残っているか）
    pub fn is_available(&self) -> bool {
        self.0 > 0
    }
}

impl Default for CopyCount {
    fn default() -> Self {
        Self::ZERO
    }
}

impl TryFrom<i32> for CopyCount {
    type Error = CopyCountError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| CopyCountError::Negative)
    }
}
