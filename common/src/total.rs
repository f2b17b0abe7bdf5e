//! 合計金額の集計
//!
//! キャッシュは持たず、呼び出しのたびに全件を再計算する。

use crate::error::{Error, Result};
use crate::types::Record;
use rust_decimal::Decimal;

/// コミット済みレコードの金額合計
///
/// 金額未設定のレコード（保留中）は合計に含めない。
/// `Decimal` の範囲を超える場合は `TotalOverflow`。
pub fn total(records: &[Record]) -> Result<Decimal> {
    records
        .iter()
        .filter_map(Record::amount)
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or(Error::TotalOverflow { max: Decimal::MAX })
}
