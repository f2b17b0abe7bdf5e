//! 表示用フォーマット

use chrono::{DateTime, Local, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::amount::CURRENCY_SYMBOL;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// 金額を "£12.50" 形式に整形（小数2桁、負数は "£-3.00"）
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", CURRENCY_SYMBOL, rounded)
}

/// 作成時刻をローカル時刻で整形
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    format_timestamp_in(timestamp, &Local)
}

/// 作成時刻を指定タイムゾーンで整形
pub fn format_timestamp_in<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_format_amount_pads_to_two_places() {
        assert_eq!(format_amount(dec("12.5")), "£12.50");
        assert_eq!(format_amount(dec("3")), "£3.00");
        assert_eq!(format_amount(Decimal::ZERO), "£0.00");
    }

    #[test]
    fn test_format_amount_rounds() {
        assert_eq!(format_amount(dec("1.005")), "£1.01");
        assert_eq!(format_amount(dec("1.004")), "£1.00");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(dec("-3")), "£-3.00");
    }

    #[test]
    fn test_format_timestamp_in_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 7, 29, 14, 5, 9).unwrap();
        assert_eq!(format_timestamp_in(ts, &Utc), "29/07/2025, 14:05:09");
    }
}
