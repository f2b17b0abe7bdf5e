//! 写真添付のエンコード/デコード
//!
//! 撮影した写真をJPEG（品質0.8）で保存用バイト列にし、表示時に戻す。
//! - エンコード失敗は「写真なし」として扱う（エラーにしない）
//! - デコード失敗は表示側でプレースホルダーに置き換える

use crate::error::{ReceiptLogError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader};
use receipt_log_common::Record;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 既定のJPEG品質 (0.0-1.0)
pub const DEFAULT_QUALITY: f32 = 0.8;

/// 表示用の画像
#[derive(Debug, Clone)]
pub enum Preview {
    Image(DynamicImage),
    /// 写真なし、またはデコードできない
    Placeholder,
}

impl Preview {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Preview::Placeholder)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    /// JPEG品質 (1-100)
    quality: u8,
}

impl ImageCodec {
    /// 品質を 0.0-1.0 で指定（範囲外は丸める）
    pub fn new(quality: f32) -> Self {
        let scaled = (quality.clamp(0.0, 1.0) * 100.0).round() as u8;
        Self {
            quality: scaled.max(1),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.quality
    }

    /// 写真をJPEGに圧縮。失敗時は None
    pub fn encode(&self, photo: &DynamicImage) -> Option<Vec<u8>> {
        if photo.width() == 0 || photo.height() == 0 {
            warn!("空の画像はエンコードできません");
            return None;
        }

        // JPEGはアルファ非対応
        let rgb = photo.to_rgb8();
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.quality);

        match rgb.write_with_encoder(encoder) {
            Ok(()) => {
                debug!(size = bytes.len(), quality = self.quality, "写真をエンコードしました");
                Some(bytes)
            }
            Err(e) => {
                warn!(error = %e, "写真のエンコードに失敗しました");
                None
            }
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes).map_err(|e| ReceiptLogError::ImageDecode(e.to_string()))
    }

    /// 保存済みペイロードから表示用画像を作る
    pub fn preview(&self, bytes: Option<&[u8]>) -> Preview {
        let Some(bytes) = bytes else {
            return Preview::Placeholder;
        };

        match self.decode(bytes) {
            Ok(image) => Preview::Image(image),
            Err(e) => {
                warn!(error = %e, "写真を表示できません");
                Preview::Placeholder
            }
        }
    }
}

impl ImageCodec {
    /// 一覧用のサムネイルを `<dir>/<id>.jpg` に書き出す
    ///
    /// 写真のないレコードとデコードできない写真は飛ばす。
    pub fn write_thumbnails(
        &self,
        records: &[Record],
        dir: &Path,
        size: u32,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for record in records {
            let Preview::Image(image) = self.preview(record.image()) else {
                continue;
            };
            let Some(bytes) = self.encode(&thumbnail(&image, size, size)) else {
                continue;
            };

            let path = dir.join(format!("{}.jpg", record.id()));
            std::fs::write(&path, bytes)?;
            written.push(path);
        }

        debug!(count = written.len(), dir = %dir.display(), "サムネイルを書き出しました");
        Ok(written)
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

/// 一覧表示用の縮小画像（縦横比は維持）
pub fn thumbnail(image: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    image.thumbnail(max_width, max_height)
}

/// 写真ファイルを読み込む
pub fn load_photo(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| ReceiptLogError::PhotoLoad(format!("{}: {}", path.display(), e)))?;

    reader
        .decode()
        .map_err(|e| ReceiptLogError::PhotoLoad(format!("{}: {}", path.display(), e)))
}
