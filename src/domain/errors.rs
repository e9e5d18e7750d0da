use super::CopyCountError;

/// 貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowBookError {
    /// 貸出可能な冊数が残っていない
    NoCopiesAvailable,
}

impl From<CopyCountError> for BorrowBookError {
    fn from(err: CopyCountError) -> Self {
        match err {
            CopyCountError::Exhausted | CopyCountError::Overflow | CopyCountError::Negative => {
                BorrowBookError::NoCopiesAvailable
            }
        }
    }
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 冊数が上限を超える
    CopyCountOverflow,
}

impl From<CopyCountError> for ReturnBookError {
    fn from(_: CopyCountError) -> Self {
        ReturnBookError::CopyCountOverflow
    }
}
