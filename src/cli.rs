use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "receipt-log")]
#[command(about = "レシート記録・合計金額管理ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データディレクトリ（設定ファイル・環境変数より優先）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// レシートを追加（--amount 省略時は対話入力）
    Add {
        /// 金額（例: "£12.50"）
        #[arg(short, long)]
        amount: Option<String>,

        /// 添付する写真ファイル
        #[arg(short, long)]
        photo: Option<PathBuf>,
    },

    /// 一覧を表示
    List {
        /// 写真のサムネイルを書き出すディレクトリ
        #[arg(long)]
        thumbnails: Option<PathBuf>,
    },

    /// 1件の詳細を表示
    Show {
        /// レコードID
        #[arg(required = true)]
        id: Uuid,

        /// 写真をファイルに書き出す
        #[arg(long)]
        save_image: Option<PathBuf>,
    },

    /// 合計金額を表示
    Total,

    /// レシートを削除
    Delete {
        /// レコードID
        #[arg(required_unless_present = "index")]
        ids: Vec<Uuid>,

        /// 一覧上の番号で指定（list の表示と同じ1始まり）
        #[arg(
            short,
            long,
            num_args = 1..,
            conflicts_with = "ids",
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        index: Vec<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// データディレクトリを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// JPEG品質を設定 (0.0-1.0)
        #[arg(long)]
        jpeg_quality: Option<f32>,

        /// 写真を撮ったら自動で保存する
        #[arg(long)]
        submit_after_photo: Option<bool>,
    },
}

/// 1始まりの番号を0始まりの位置に変換（0 は clap が受け付けない）
pub fn to_offsets(numbers: &[usize]) -> Vec<usize> {
    numbers.iter().filter_map(|&n| n.checked_sub(1)).collect()
}
