//! Receipt Log Common Library
//!
//! レシート記録の型と、ストレージやUIに依存しない純粋なロジック

pub mod types;
pub mod error;
pub mod amount;
pub mod total;
pub mod format;

pub use types::Record;
pub use error::{Error, Result};
pub use amount::{parse_amount, CURRENCY_SYMBOL};
pub use total::total;
pub use format::{format_amount, format_timestamp};
