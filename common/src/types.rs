//! レシート記録の型定義
//!
//! - Record: 1件のレシート（作成時刻・金額・任意の写真）
//!
//! 作成直後は金額が未設定の「保留中」状態。金額を設定してストアに
//! コミットされたものだけが永続化される。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// レシート1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    id: Uuid,

    /// 作成時刻（UTC）
    timestamp: DateTime<Utc>,

    /// 金額（GBP）。コミットまでは None
    #[serde(default)]
    amount: Option<Decimal>,

    /// エンコード済み写真（JPEG）。JSONではbase64文字列
    #[serde(default, with = "base64_payload", skip_serializing_if = "Option::is_none")]
    image: Option<Vec<u8>>,
}

impl Record {
    /// 現在時刻で新しい保留中レコードを作成
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// 指定時刻で新しい保留中レコードを作成
    pub fn new_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            amount: None,
            image: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    /// 写真が添付されているか（一覧のアイコン表示用）
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = Some(amount);
    }

    pub fn set_image(&mut self, image: Option<Vec<u8>>) {
        self.image = image;
    }

    /// 金額を設定したレコードを返す（テスト・インポート用）
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.set_amount(amount);
        self
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

mod base64_payload {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_some(&STANDARD.encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
