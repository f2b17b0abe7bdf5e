//! レシート記録ツール
//!
//! 金額と任意のレシート写真を時刻付きで保存し、合計金額を表示する。

pub mod camera;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod prompt;
pub mod store;
pub mod workflow;

pub use codec::{ImageCodec, Preview};
pub use error::{ReceiptLogError, Result};
pub use store::{JsonFileStorage, MemoryStorage, RecordStore, Storage};
pub use workflow::{EntryWorkflow, PhotoOutcome, SubmitOutcome, WorkflowOptions};
