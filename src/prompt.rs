//! 対話式のレシート入力
//!
//! 金額入力 → [写真を撮る / 保存 / キャンセル] を繰り返す。
//! 金額が読み取れない場合はもう一度入力を求める。

use crate::camera::Camera;
use crate::codec::{load_photo, ImageCodec};
use crate::error::{ReceiptLogError, Result};
use crate::store::{RecordStore, Storage};
use crate::workflow::{EntryWorkflow, PhotoOutcome, SubmitOutcome};
use dialoguer::{Input, Select};
use image::DynamicImage;
use receipt_log_common::{format_amount, Record};

const ACTIONS: &[&str] = &["写真を撮る", "保存", "キャンセル"];

/// 写真ファイルのパスを尋ねるカメラ（空入力で撮影取りやめ）
pub struct PromptCamera;

impl Camera for PromptCamera {
    fn capture(&mut self) -> Result<Option<DynamicImage>> {
        let path: String = Input::new()
            .with_prompt("写真ファイルのパス（空欄で中止）")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ReceiptLogError::Prompt(e.to_string()))?;

        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }

        match load_photo(std::path::Path::new(path)) {
            Ok(photo) => Ok(Some(photo)),
            Err(e) => {
                println!("  {}", e);
                Ok(None)
            }
        }
    }
}

/// 対話式で1件入力する。キャンセル時は `None`
pub fn run_interactive_add<S: Storage>(
    workflow: &mut EntryWorkflow,
    store: &mut RecordStore<S>,
    codec: &ImageCodec,
) -> Result<Option<Record>> {
    workflow.begin(store)?;
    println!("金額（GBP）を入力し、レシートの写真を撮ってください");

    loop {
        let current = workflow
            .pending()
            .map(|p| p.input().to_string())
            .unwrap_or_default();

        let input: String = Input::new()
            .with_prompt("金額 £")
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ReceiptLogError::Prompt(e.to_string()))?;
        workflow.set_input(input)?;

        let action = Select::new()
            .with_prompt("操作")
            .items(ACTIONS)
            .default(1)
            .interact()
            .map_err(|e| ReceiptLogError::Prompt(e.to_string()))?;

        let outcome = match action {
            0 => match workflow.take_photo(&mut PromptCamera, store, codec)? {
                PhotoOutcome::Captured => {
                    println!("  📷 写真を添付しました");
                    continue;
                }
                PhotoOutcome::Dismissed => continue,
                PhotoOutcome::Submitted(outcome) => outcome,
            },
            1 => workflow.submit(store, codec)?,
            _ => {
                workflow.cancel()?;
                println!("キャンセルしました");
                return Ok(None);
            }
        };

        match outcome {
            SubmitOutcome::Committed(record) => {
                if let Some(amount) = record.amount() {
                    println!("✔ {} を保存しました", format_amount(amount));
                }
                return Ok(Some(record));
            }
            SubmitOutcome::Rejected => {
                println!("  金額を読み取れません（例: 12.50）");
            }
        }
    }
}
