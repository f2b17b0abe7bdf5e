use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ReceiptLogError {
    #[error("設定エラー: {0}")]
    Config(String),

    /// ストレージへの書き込み・読み込み失敗（再試行可能）
    #[error("保存エラー: {0}")]
    Persistence(String),

    #[error("保存データが破損しています: {0}")]
    CorruptStore(String),

    #[error("レコードが見つかりません: {0}")]
    RecordNotFound(Uuid),

    #[error("一覧の範囲外の位置です: {0}")]
    InvalidOffset(usize),

    #[error("金額が未設定のレコードは保存できません")]
    AmountNotSet,

    #[error("この状態では実行できません: {0}")]
    InvalidTransition(&'static str),

    #[error("写真の撮影中です")]
    CaptureInProgress,

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("写真の読み込みに失敗: {0}")]
    PhotoLoad(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] receipt_log_common::Error),
}

pub type Result<T> = std::result::Result<T, ReceiptLogError>;
