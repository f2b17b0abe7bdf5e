//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 金額として解釈できない入力
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// 合計が Decimal の範囲を超えた
    #[error("Total overflow: the sum of amounts exceeds {max}")]
    TotalOverflow { max: rust_decimal::Decimal },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
