//! JSONファイルによる永続化
//!
//! `<data_dir>/receipts.json` にバージョン付きで全件を書き出す。
//! 一時ファイルに書いてからリネームするので、書き込み途中で落ちても
//! 以前のファイルは壊れない。

use super::Storage;
use crate::error::{ReceiptLogError, Result};
use receipt_log_common::Record;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STORE_FILE_NAME: &str = "receipts.json";
const CURRENT_VERSION: u32 = 1;

/// 保存ファイルの構造（読み込み用）
#[derive(Debug, Deserialize)]
struct StoreFile {
    version: u32,
    records: Vec<Record>,
}

/// 保存ファイルの構造（書き出し用、レコードを複製しない）
#[derive(Serialize)]
struct StoreFileRef<'a> {
    version: u32,
    records: &'a [Record],
}

#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// データディレクトリ内の標準ファイルを使う
    pub fn new(data_dir: &Path) -> Self {
        Self::at(data_dir.join(STORE_FILE_NAME))
    }

    /// 任意のファイルパスを使う
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, e: impl std::fmt::Display) -> ReceiptLogError {
        ReceiptLogError::Persistence(format!("{}: {}", self.path.display(), e))
    }

    fn write_file(&self, records: &[Record]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = self.temp_path();
        let result = Self::write_temp(&temp_path, records)
            .and_then(|()| std::fs::rename(&temp_path, &self.path));
        if result.is_err() && temp_path.exists() {
            if let Err(e) = std::fs::remove_file(&temp_path) {
                warn!(path = %temp_path.display(), error = %e, "一時ファイルを削除できません");
            }
        }
        result
    }

    fn write_temp(temp_path: &Path, records: &[Record]) -> std::io::Result<()> {
        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        let doc = StoreFileRef {
            version: CURRENT_VERSION,
            records,
        };
        serde_json::to_writer_pretty(&mut writer, &doc)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|e| self.persistence_error(e))?;
        let reader = BufReader::new(file);
        let doc: StoreFile = serde_json::from_reader(reader).map_err(|e| {
            ReceiptLogError::CorruptStore(format!("{}: {}", self.path.display(), e))
        })?;

        // 破損・非互換のファイルを空として扱うとデータを失うのでエラーにする
        if doc.version != CURRENT_VERSION {
            return Err(ReceiptLogError::CorruptStore(format!(
                "{}: 未対応のバージョン {}",
                self.path.display(),
                doc.version
            )));
        }

        debug!(path = %self.path.display(), count = doc.records.len(), "保存ファイルを読み込みました");
        Ok(doc.records)
    }

    fn save(&mut self, records: &[Record]) -> Result<()> {
        self.write_file(records).map_err(|e| self.persistence_error(e))?;
        debug!(path = %self.path.display(), count = records.len(), "保存しました");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_directory_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let data_dir = dir.path().join("a").join("b");
        let mut storage = JsonFileStorage::new(&data_dir);

        storage.save(&[Record::new().with_amount(Decimal::ONE)]).unwrap();

        assert!(data_dir.join("receipts.json").exists());
        assert!(!data_dir.join("receipts.json.tmp").exists());
    }

    #[test]
    fn test_file_has_version() {
        let dir = tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        storage.save(&[]).unwrap();

        let content = std::fs::read_to_string(storage.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["records"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());
        std::fs::write(storage.path(), r#"{"version": 99, "records": []}"#).unwrap();

        assert!(matches!(storage.load(), Err(ReceiptLogError::CorruptStore(_))));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path());
        // 保存先の位置にディレクトリがあるとリネームが失敗する
        std::fs::create_dir(storage.path()).unwrap();
        std::fs::write(storage.path().join("keep"), "x").unwrap();

        let result = storage.save(&[Record::new().with_amount(Decimal::ONE)]);
        assert!(matches!(result, Err(ReceiptLogError::Persistence(_))));
        assert!(!dir.path().join("receipts.json.tmp").exists());
    }

    #[test]
    fn test_save_into_unwritable_location_is_persistence_error() {
        let dir = tempdir().unwrap();
        // 親ディレクトリの位置に通常ファイルを置く
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let mut storage = JsonFileStorage::new(&blocker);

        let result = storage.save(&[]);
        assert!(matches!(result, Err(ReceiptLogError::Persistence(_))));
    }
}
