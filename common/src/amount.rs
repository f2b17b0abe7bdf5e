//! 金額入力パーサー
//!
//! ユーザーが入力した金額文字列を Decimal に変換する。
//!
//! 処理順:
//! 1. 通貨記号 `£` をすべて除去（位置は問わない）
//! 2. 前後の空白・改行を除去
//! 3. 通常の小数表記としてパース（桁区切り・指数表記・ロケールは非対応）

use crate::error::{Error, Result};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 認識する通貨記号
pub const CURRENCY_SYMBOL: char = '£';

/// 入力文字列を金額にパース
///
/// 負の値は受け付ける（範囲チェックは行わない）。
///
/// # Examples
/// ```
/// use receipt_log_common::parse_amount;
///
/// let amount = parse_amount(" £12.50 ").unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// assert!(parse_amount("abc").is_err());
/// ```
pub fn parse_amount(text: &str) -> Result<Decimal> {
    lazy_static::lazy_static! {
        // 符号 + 整数部/小数部（"12", "12.5", ".5", "5."）
        static ref DECIMAL_RE: Regex = Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)$").unwrap();
    }

    let cleaned: String = text.chars().filter(|&c| c != CURRENCY_SYMBOL).collect();
    let cleaned = cleaned.trim();

    if !DECIMAL_RE.is_match(cleaned) {
        return Err(Error::InvalidAmount(text.to_string()));
    }

    // 符号と省略形（".5", "5."）を Decimal が確実に読める形へ正規化
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned)),
    };
    let body = body.strip_suffix('.').unwrap_or(body);
    let body = if body.starts_with('.') {
        format!("0{}", body)
    } else {
        body.to_string()
    };

    let mut value =
        Decimal::from_str(&body).map_err(|_| Error::InvalidAmount(text.to_string()))?;
    if negative {
        value.set_sign_negative(true);
    }
    Ok(value)
}
