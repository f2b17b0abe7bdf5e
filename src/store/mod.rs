//! レコードストア
//!
//! コミット済みレシートの一覧を所有し、変更のたびにストレージへ書き出す。
//! 一覧は常に作成時刻の昇順。書き込みに失敗した場合はメモリ上の一覧を
//! 呼び出し前の状態に戻してエラーを返す。

mod file;
mod memory;

pub use file::JsonFileStorage;
pub use memory::MemoryStorage;

use crate::error::{ReceiptLogError, Result};
use receipt_log_common::{total, Record};
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 永続化先
pub trait Storage {
    /// 保存済みの全レコードを読み込む
    fn load(&self) -> Result<Vec<Record>>;

    /// 全レコードを書き出す
    fn save(&mut self, records: &[Record]) -> Result<()>;
}

pub struct RecordStore<S: Storage> {
    storage: S,
    records: Vec<Record>,
}

impl<S: Storage> RecordStore<S> {
    /// ストレージから読み込んでストアを開く
    pub fn open(storage: S) -> Result<Self> {
        let mut records = storage.load()?;

        if let Some(bad) = records.iter().find(|r| r.amount().is_none()) {
            return Err(ReceiptLogError::CorruptStore(format!(
                "金額のないレコード: {}",
                bad.id()
            )));
        }

        records.sort_by_key(Record::timestamp);
        debug!(count = records.len(), "レコードを読み込みました");

        Ok(Self { storage, records })
    }

    /// 新しい保留中レコードを作成（まだ保存しない）
    pub fn create(&self) -> Record {
        Record::new()
    }

    /// レコードを確定して保存
    ///
    /// 同じIDのレコードがあれば置き換える。合計が `Decimal` の範囲を
    /// 超えるレコードは保存せず `TotalOverflow` を返す。
    pub fn commit(&mut self, record: Record) -> Result<()> {
        if record.amount().is_none() {
            return Err(ReceiptLogError::AmountNotSet);
        }

        let id = record.id();
        let previous = self.position(id).map(|i| (i, self.records.remove(i)));
        let at = self
            .records
            .partition_point(|r| r.timestamp() <= record.timestamp());
        self.records.insert(at, record);

        let result = total(&self.records)
            .map_err(ReceiptLogError::from)
            .and_then(|_| self.storage.save(&self.records));
        if let Err(e) = result {
            self.records.remove(at);
            if let Some((i, old)) = previous {
                self.records.insert(i, old);
            }
            warn!(%id, error = %e, "コミットに失敗しました");
            return Err(e);
        }

        info!(%id, count = self.records.len(), "レコードをコミットしました");
        Ok(())
    }

    /// 作成時刻の昇順に並んだコミット済みレコード
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// IDでレコードを削除
    ///
    /// 存在しないIDは `RecordNotFound`（ストレージには触れない）。
    pub fn delete(&mut self, id: Uuid) -> Result<Record> {
        let index = self
            .position(id)
            .ok_or(ReceiptLogError::RecordNotFound(id))?;
        let removed = self.records.remove(index);

        if let Err(e) = self.storage.save(&self.records) {
            self.records.insert(index, removed);
            warn!(%id, error = %e, "削除に失敗しました");
            return Err(e);
        }

        info!(%id, "レコードを削除しました");
        Ok(removed)
    }

    /// 複数のIDを順に削除（1件ごとに保存）
    ///
    /// 先に全IDの存在を確認し、見つからないIDがあれば何も削除しない。
    pub fn delete_ids(&mut self, ids: &[Uuid]) -> Result<Vec<Record>> {
        if let Some(&missing) = ids.iter().find(|&&id| self.position(id).is_none()) {
            return Err(ReceiptLogError::RecordNotFound(missing));
        }

        let mut seen = HashSet::new();
        ids.iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .map(|id| self.delete(id))
            .collect()
    }

    /// 一覧上の位置で複数レコードをまとめて削除（保存は1回）
    ///
    /// 範囲外の位置が含まれる場合は何も削除しない。
    pub fn delete_at(&mut self, offsets: &[usize]) -> Result<Vec<Record>> {
        if let Some(&bad) = offsets.iter().find(|&&i| i >= self.records.len()) {
            return Err(ReceiptLogError::InvalidOffset(bad));
        }

        let mut indices = offsets.to_vec();
        indices.sort_unstable();
        indices.dedup();

        let mut removed: Vec<(usize, Record)> = indices
            .iter()
            .rev()
            .map(|&i| (i, self.records.remove(i)))
            .collect();
        removed.reverse();

        if let Err(e) = self.storage.save(&self.records) {
            for (i, record) in removed {
                self.records.insert(i, record);
            }
            warn!(error = %e, "一括削除に失敗しました");
            return Err(e);
        }

        info!(count = removed.len(), "レコードを一括削除しました");
        Ok(removed.into_iter().map(|(_, r)| r).collect())
    }

    /// 全レコードの合計金額（毎回再計算）
    pub fn total(&self) -> Result<Decimal> {
        Ok(total(&self.records)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }
}
