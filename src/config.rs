use crate::error::{ReceiptLogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データディレクトリを上書きする環境変数
pub const DATA_DIR_ENV: &str = "RECEIPT_LOG_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    /// JPEG品質 (0.0-1.0)
    pub jpeg_quality: f32,
    pub thumbnail_size: u32,
    /// 写真を撮ったらそのまま保存する
    pub submit_after_photo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            jpeg_quality: 0.8,
            thumbnail_size: 220,
            submit_after_photo: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReceiptLogError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("receipt-log").join("config.json"))
    }

    /// レコードの保存先ディレクトリ
    ///
    /// 優先順位: 環境変数 > 設定ファイル > OS標準のデータディレクトリ
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        let base = dirs::data_dir()
            .ok_or_else(|| ReceiptLogError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("receipt-log"))
    }

    pub fn set_jpeg_quality(&mut self, quality: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(ReceiptLogError::Config(format!(
                "JPEG品質は0.0〜1.0で指定してください: {}",
                quality
            )));
        }
        self.jpeg_quality = quality;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.jpeg_quality) {
            return Err(ReceiptLogError::Config(format!(
                "jpeg_quality が範囲外です: {}",
                self.jpeg_quality
            )));
        }
        if self.thumbnail_size == 0 {
            return Err(ReceiptLogError::Config("thumbnail_size は1以上".into()));
        }
        Ok(())
    }
}
