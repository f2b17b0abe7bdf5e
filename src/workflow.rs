//! 入力ワークフロー（状態機械）
//!
//! ```text
//! Idle --begin--> PendingAmount --submit--> (Committed) --> Idle
//!                   |   ^    \--cancel--> (Cancelled) --> Idle
//!                   \---/ take_photo
//! ```
//!
//! 保留中のレコード・入力中の文字列・撮影した写真はすべてこの構造体が
//! 所有する。金額が読み取れない場合は何もせず保留状態のまま残る。

use crate::camera::Camera;
use crate::codec::ImageCodec;
use crate::error::{ReceiptLogError, Result};
use crate::store::{RecordStore, Storage};
use image::DynamicImage;
use receipt_log_common::{parse_amount, Record};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowOptions {
    /// 写真を撮ったら続けて保存まで行う
    pub submit_after_photo: bool,
}

/// 保留中の入力
#[derive(Debug, Clone)]
pub struct PendingEntry {
    record: Record,
    input: String,
    photo: Option<DynamicImage>,
    capturing: bool,
}

impl PendingEntry {
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }
}

#[derive(Debug, Clone, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    PendingAmount(PendingEntry),
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// 保存されたレコード
    Committed(Record),
    /// 金額を読み取れなかった（保留状態のまま）
    Rejected,
}

#[derive(Debug, Clone)]
pub enum PhotoOutcome {
    Captured,
    Dismissed,
    /// 撮影後に自動で保存を試みた
    Submitted(SubmitOutcome),
}

#[derive(Debug, Default)]
pub struct EntryWorkflow {
    state: WorkflowState,
    options: WorkflowOptions,
}

impl EntryWorkflow {
    pub fn new(options: WorkflowOptions) -> Self {
        Self {
            state: WorkflowState::Idle,
            options,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WorkflowState::Idle)
    }

    pub fn pending(&self) -> Option<&PendingEntry> {
        match &self.state {
            WorkflowState::PendingAmount(entry) => Some(entry),
            WorkflowState::Idle => None,
        }
    }

    /// 新規入力を開始（Idle → PendingAmount）
    ///
    /// 作成した保留中レコードの複製を返す（写真はまだ持たない）。
    pub fn begin<S: Storage>(&mut self, store: &RecordStore<S>) -> Result<Record> {
        if !self.is_idle() {
            return Err(ReceiptLogError::InvalidTransition("入力中のレコードがあります"));
        }

        let record = store.create();
        debug!(id = %record.id(), "新規入力を開始しました");
        self.state = WorkflowState::PendingAmount(PendingEntry {
            record: record.clone(),
            input: String::new(),
            photo: None,
            capturing: false,
        });
        Ok(record)
    }

    /// 金額の入力文字列を更新
    pub fn set_input(&mut self, text: impl Into<String>) -> Result<()> {
        let entry = self.ready_entry()?;
        entry.input = text.into();
        Ok(())
    }

    /// 撮影を開始（完了まで保存・キャンセルを受け付けない）
    pub fn start_capture(&mut self) -> Result<()> {
        let entry = self.ready_entry()?;
        entry.capturing = true;
        Ok(())
    }

    /// 撮影を終了。`None` は撮影の取りやめで、以前の写真はそのまま残る
    pub fn finish_capture(&mut self, photo: Option<DynamicImage>) -> Result<bool> {
        let entry = match &mut self.state {
            WorkflowState::PendingAmount(entry) if entry.capturing => entry,
            _ => return Err(ReceiptLogError::InvalidTransition("撮影中ではありません")),
        };

        entry.capturing = false;
        match photo {
            Some(photo) => {
                debug!(width = photo.width(), height = photo.height(), "写真を受け取りました");
                entry.photo = Some(photo);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// カメラで撮影する
    ///
    /// `submit_after_photo` が有効なら撮影成功後にそのまま `submit` する。
    pub fn take_photo<S: Storage, C: Camera>(
        &mut self,
        camera: &mut C,
        store: &mut RecordStore<S>,
        codec: &ImageCodec,
    ) -> Result<PhotoOutcome> {
        self.start_capture()?;

        let photo = match camera.capture() {
            Ok(photo) => photo,
            Err(e) => {
                self.finish_capture(None)?;
                return Err(e);
            }
        };

        if !self.finish_capture(photo)? {
            return Ok(PhotoOutcome::Dismissed);
        }

        if self.options.submit_after_photo {
            return self.submit(store, codec).map(PhotoOutcome::Submitted);
        }
        Ok(PhotoOutcome::Captured)
    }

    /// 入力を確定して保存
    ///
    /// 金額が読み取れなければ `Rejected` を返し保留状態を維持する。
    /// 保存に失敗した場合も入力と写真は残るので再試行できる。
    pub fn submit<S: Storage>(
        &mut self,
        store: &mut RecordStore<S>,
        codec: &ImageCodec,
    ) -> Result<SubmitOutcome> {
        let entry = self.ready_entry()?;

        let amount = match parse_amount(&entry.input) {
            Ok(amount) => amount,
            Err(e) => {
                debug!(error = %e, "金額を読み取れませんでした");
                return Ok(SubmitOutcome::Rejected);
            }
        };

        let mut record = entry.record.clone();
        record.set_amount(amount);
        record.set_image(entry.photo.as_ref().and_then(|photo| codec.encode(photo)));

        store.commit(record.clone())?;

        info!(id = %record.id(), has_image = record.has_image(), "入力を保存しました");
        self.state = WorkflowState::Idle;
        Ok(SubmitOutcome::Committed(record))
    }

    /// 入力を破棄（保存はしない）
    pub fn cancel(&mut self) -> Result<()> {
        let entry = self.ready_entry()?;
        debug!(id = %entry.record.id(), "入力をキャンセルしました");
        self.state = WorkflowState::Idle;
        Ok(())
    }

    /// 撮影中でない保留状態のエントリ
    fn ready_entry(&mut self) -> Result<&mut PendingEntry> {
        match &mut self.state {
            WorkflowState::Idle => Err(ReceiptLogError::InvalidTransition("入力中のレコードがありません")),
            WorkflowState::PendingAmount(entry) if entry.capturing => {
                Err(ReceiptLogError::CaptureInProgress)
            }
            WorkflowState::PendingAmount(entry) => Ok(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStorage;
    use image::RgbImage;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    struct FixedCamera(Option<DynamicImage>);

    impl Camera for FixedCamera {
        fn capture(&mut self) -> Result<Option<DynamicImage>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenCamera;

    impl Camera for BrokenCamera {
        fn capture(&mut self) -> Result<Option<DynamicImage>> {
            Err(ReceiptLogError::PhotoLoad("no device".into()))
        }
    }

    fn photo() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, image::Rgb([200, 100, 50])))
    }

    fn setup() -> (EntryWorkflow, RecordStore<MemoryStorage>, ImageCodec) {
        (
            EntryWorkflow::default(),
            RecordStore::open(MemoryStorage::new()).unwrap(),
            ImageCodec::default(),
        )
    }

    #[test]
    fn test_begin_creates_pending_record() {
        let (mut wf, store, _) = setup();
        let id = wf.begin(&store).unwrap().id();

        let pending = wf.pending().unwrap();
        assert_eq!(pending.record().id(), id);
        assert!(pending.record().amount().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let (mut wf, store, _) = setup();
        wf.begin(&store).unwrap();
        assert!(matches!(wf.begin(&store), Err(ReceiptLogError::InvalidTransition(_))));
    }

    #[test]
    fn test_submit_keeps_pending_timestamp() {
        let (mut wf, mut store, codec) = setup();
        let created_at = wf.begin(&store).unwrap().timestamp();
        wf.set_input("1.00").unwrap();

        match wf.submit(&mut store, &codec).unwrap() {
            SubmitOutcome::Committed(record) => assert_eq!(record.timestamp(), created_at),
            SubmitOutcome::Rejected => panic!("rejected"),
        }
    }

    #[test]
    fn test_operations_require_pending() {
        let (mut wf, mut store, codec) = setup();
        assert!(wf.set_input("1").is_err());
        assert!(wf.cancel().is_err());
        assert!(wf.start_capture().is_err());
        assert!(matches!(
            wf.submit(&mut store, &codec),
            Err(ReceiptLogError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_capture_blocks_submit_and_cancel() {
        let (mut wf, mut store, codec) = setup();
        wf.begin(&store).unwrap();
        wf.set_input("2.00").unwrap();
        wf.start_capture().unwrap();

        assert!(matches!(wf.submit(&mut store, &codec), Err(ReceiptLogError::CaptureInProgress)));
        assert!(matches!(wf.cancel(), Err(ReceiptLogError::CaptureInProgress)));
        assert!(store.is_empty());

        assert!(wf.finish_capture(Some(photo())).unwrap());
        assert!(wf.pending().unwrap().has_photo());
        assert!(matches!(wf.submit(&mut store, &codec).unwrap(), SubmitOutcome::Committed(_)));
    }

    #[test]
    fn test_finish_capture_without_start() {
        let (mut wf, store, _) = setup();
        wf.begin(&store).unwrap();
        assert!(wf.finish_capture(None).is_err());
    }

    #[test]
    fn test_dismissed_capture_keeps_previous_photo() {
        let (mut wf, mut store, codec) = setup();
        wf.begin(&store).unwrap();
        wf.take_photo(&mut FixedCamera(Some(photo())), &mut store, &codec).unwrap();

        let outcome = wf.take_photo(&mut FixedCamera(None), &mut store, &codec).unwrap();
        assert!(matches!(outcome, PhotoOutcome::Dismissed));
        assert!(wf.pending().unwrap().has_photo());
    }

    #[test]
    fn test_camera_error_releases_capture() {
        let (mut wf, mut store, codec) = setup();
        wf.begin(&store).unwrap();

        assert!(wf.take_photo(&mut BrokenCamera, &mut store, &codec).is_err());
        assert!(!wf.pending().unwrap().is_capturing());
        assert!(wf.cancel().is_ok());
    }

    #[test]
    fn test_submit_after_photo_option() {
        let mut wf = EntryWorkflow::new(WorkflowOptions { submit_after_photo: true });
        let mut store = RecordStore::open(MemoryStorage::new()).unwrap();
        let codec = ImageCodec::default();

        wf.begin(&store).unwrap();
        wf.set_input("£4.20").unwrap();
        let outcome = wf.take_photo(&mut FixedCamera(Some(photo())), &mut store, &codec).unwrap();

        assert!(matches!(outcome, PhotoOutcome::Submitted(SubmitOutcome::Committed(_))));
        assert!(wf.is_idle());
        assert_eq!(store.list()[0].amount(), Some(Decimal::from_str("4.20").unwrap()));
        assert!(store.list()[0].has_image());
    }

    #[test]
    fn test_submit_after_photo_with_bad_amount_stays_pending() {
        let mut wf = EntryWorkflow::new(WorkflowOptions { submit_after_photo: true });
        let mut store = RecordStore::open(MemoryStorage::new()).unwrap();
        let codec = ImageCodec::default();

        wf.begin(&store).unwrap();
        let outcome = wf.take_photo(&mut FixedCamera(Some(photo())), &mut store, &codec).unwrap();

        assert!(matches!(outcome, PhotoOutcome::Submitted(SubmitOutcome::Rejected)));
        assert!(wf.pending().unwrap().has_photo());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unencodable_photo_commits_without_image() {
        let (mut wf, mut store, codec) = setup();
        wf.begin(&store).unwrap();
        wf.set_input("1").unwrap();
        wf.start_capture().unwrap();
        wf.finish_capture(Some(DynamicImage::ImageRgb8(RgbImage::new(0, 0)))).unwrap();

        match wf.submit(&mut store, &codec).unwrap() {
            SubmitOutcome::Committed(record) => assert!(!record.has_image()),
            SubmitOutcome::Rejected => panic!("rejected"),
        }
    }

    #[test]
    fn test_total_overflow_keeps_entry_pending() {
        let (mut wf, mut store, codec) = setup();
        let max = "£79228162514264337593543950335";
        wf.begin(&store).unwrap();
        wf.set_input(max).unwrap();
        assert!(matches!(wf.submit(&mut store, &codec).unwrap(), SubmitOutcome::Committed(_)));

        wf.begin(&store).unwrap();
        wf.set_input(max).unwrap();
        assert!(matches!(
            wf.submit(&mut store, &codec),
            Err(ReceiptLogError::Common(receipt_log_common::Error::TotalOverflow { .. }))
        ));
        assert_eq!(wf.pending().unwrap().input(), max);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total().unwrap(), Decimal::MAX);
    }

    #[test]
    fn test_persistence_failure_keeps_entry_for_retry() {
        let (mut wf, mut store, codec) = setup();
        wf.begin(&store).unwrap();
        wf.set_input("7.77").unwrap();
        wf.take_photo(&mut FixedCamera(Some(photo())), &mut store, &codec).unwrap();

        store.storage_mut().set_fail_writes(true);
        assert!(matches!(
            wf.submit(&mut store, &codec),
            Err(ReceiptLogError::Persistence(_))
        ));
        let pending = wf.pending().unwrap();
        assert_eq!(pending.input(), "7.77");
        assert!(pending.has_photo());

        store.storage_mut().set_fail_writes(false);
        assert!(matches!(wf.submit(&mut store, &codec).unwrap(), SubmitOutcome::Committed(_)));
        assert_eq!(store.len(), 1);
    }
}
