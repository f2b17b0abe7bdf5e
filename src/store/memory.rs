use super::Storage;
use crate::error::{ReceiptLogError, Result};
use receipt_log_common::Record;

/// プロセス内ストレージ（テスト・ドライラン用）
///
/// `set_fail_writes(true)` 以降の書き込みは `Persistence` エラーになる。
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    saved: Vec<Record>,
    save_count: usize,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            saved: records,
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// 最後に保存された内容
    pub fn saved(&self) -> &[Record] {
        &self.saved
    }

    /// 成功した書き込み回数
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Vec<Record>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, records: &[Record]) -> Result<()> {
        if self.fail_writes {
            return Err(ReceiptLogError::Persistence("書き込みが無効化されています".into()));
        }
        self.saved = records.to_vec();
        self.save_count += 1;
        Ok(())
    }
}
