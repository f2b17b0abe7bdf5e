//! 撮影デバイスの抽象化
//!
//! 端末版ではカメラの代わりに写真ファイルを読み込む。

use crate::codec::load_photo;
use crate::error::Result;
use image::DynamicImage;
use std::path::PathBuf;

pub trait Camera {
    /// 撮影する。`Ok(None)` はユーザーが撮影を取りやめた場合
    fn capture(&mut self) -> Result<Option<DynamicImage>>;
}

/// 指定されたファイルを「撮影結果」として返す
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Camera for FileCamera {
    fn capture(&mut self) -> Result<Option<DynamicImage>> {
        load_photo(&self.path).map(Some)
    }
}
