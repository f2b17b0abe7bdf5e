use anyhow::{anyhow, bail, Context};
use clap::Parser;
use receipt_log::camera::FileCamera;
use receipt_log::cli::{self, Cli, Commands};
use receipt_log::config::Config;
use receipt_log::{
    prompt, EntryWorkflow, ImageCodec, JsonFileStorage, PhotoOutcome, Preview, ReceiptLogError,
    RecordStore, SubmitOutcome, WorkflowOptions,
};
use receipt_log_common::{format_amount, format_timestamp};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Config { show, set_data_dir, jpeg_quality, submit_after_photo } => {
            run_config(&mut config, show, set_data_dir, jpeg_quality, submit_after_photo)
        }
        command => {
            let data_dir = match cli.data_dir {
                Some(dir) => dir,
                None => config.resolve_data_dir()?,
            };
            let mut store = RecordStore::open(JsonFileStorage::new(&data_dir))
                .with_context(|| format!("レシートを読み込めません: {}", data_dir.display()))?;
            run_records(command, &config, &mut store)
        }
    }
}

fn run_config(
    config: &mut Config,
    show: bool,
    set_data_dir: Option<PathBuf>,
    jpeg_quality: Option<f32>,
    submit_after_photo: Option<bool>,
) -> anyhow::Result<()> {
    let changed = set_data_dir.is_some() || jpeg_quality.is_some() || submit_after_photo.is_some();

    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(quality) = jpeg_quality {
        config.set_jpeg_quality(quality)?;
    }
    if let Some(flag) = submit_after_photo {
        config.submit_after_photo = flag;
    }
    if changed {
        config.save()?;
        println!("✔ 設定を保存しました");
    }

    if show || !changed {
        println!("設定:");
        println!("  データディレクトリ: {}", config.resolve_data_dir()?.display());
        println!("  JPEG品質: {}", config.jpeg_quality);
        println!("  サムネイルサイズ: {}px", config.thumbnail_size);
        println!("  撮影後に自動保存: {}", if config.submit_after_photo { "有効" } else { "無効" });
    }
    Ok(())
}

fn run_records(
    command: Commands,
    config: &Config,
    store: &mut RecordStore<JsonFileStorage>,
) -> anyhow::Result<()> {
    let codec = ImageCodec::new(config.jpeg_quality);

    match command {
        Commands::Add { amount, photo } => {
            let mut workflow = EntryWorkflow::new(WorkflowOptions {
                submit_after_photo: config.submit_after_photo,
            });

            let Some(amount) = amount else {
                prompt::run_interactive_add(&mut workflow, store, &codec)?;
                return Ok(());
            };

            workflow.begin(store)?;
            workflow.set_input(amount.clone())?;

            let mut outcome = None;
            if let Some(path) = photo {
                if let PhotoOutcome::Submitted(result) =
                    workflow.take_photo(&mut FileCamera::new(path), store, &codec)?
                {
                    outcome = Some(result);
                }
            }
            let outcome = match outcome {
                Some(outcome) => outcome,
                None => workflow.submit(store, &codec)?,
            };

            match outcome {
                SubmitOutcome::Committed(record) => {
                    let amount = record.amount().map(format_amount).unwrap_or_default();
                    println!(
                        "✔ {} を保存しました{} ({})",
                        amount,
                        if record.has_image() { " 📷" } else { "" },
                        record.id()
                    );
                }
                SubmitOutcome::Rejected => {
                    workflow.cancel()?;
                    bail!("金額を読み取れません: {:?}", amount);
                }
            }
        }

        Commands::List { thumbnails } => {
            print_total(store);
            if store.is_empty() {
                println!("レシートはまだありません");
            }
            for (i, record) in store.list().iter().enumerate() {
                println!(
                    "{:>3}. {}  {:>10}  {}  {}",
                    i + 1,
                    format_timestamp(record.timestamp()),
                    record.amount().map(format_amount).unwrap_or_default(),
                    if record.has_image() { "📷" } else { "  " },
                    record.id()
                );
            }

            if let Some(dir) = thumbnails {
                let written = codec
                    .write_thumbnails(store.list(), &dir, config.thumbnail_size)
                    .with_context(|| format!("サムネイルを書き出せません: {}", dir.display()))?;
                println!("✔ サムネイルを{}件書き出しました: {}", written.len(), dir.display());
            }
        }

        Commands::Show { id, save_image } => {
            let record = store
                .get(id)
                .with_context(|| format!("レコードが見つかりません: {}", id))?;

            println!("レシート詳細");
            println!("  日時: {}", format_timestamp(record.timestamp()));
            println!(
                "  金額: {}",
                record.amount().map(format_amount).unwrap_or_default()
            );

            match codec.preview(record.image()) {
                Preview::Image(image) => {
                    println!("  写真: {}x{}px", image.width(), image.height());
                    if let Some(path) = save_image {
                        image
                            .save(&path)
                            .with_context(|| format!("写真を保存できません: {}", path.display()))?;
                        println!("✔ 写真を書き出しました: {}", path.display());
                    }
                }
                Preview::Placeholder => println!("  写真はありません"),
            }
        }

        Commands::Total => {
            println!("合計: {}", format_amount(store.total()?));
        }

        Commands::Delete { ids, index } => {
            let removed = if index.is_empty() {
                store.delete_ids(&ids)?
            } else {
                store
                    .delete_at(&cli::to_offsets(&index))
                    .map_err(|e| match e {
                        ReceiptLogError::InvalidOffset(offset) => {
                            anyhow!("一覧に {} 番はありません", offset + 1)
                        }
                        e => e.into(),
                    })?
            };

            for record in &removed {
                println!(
                    "✔ 削除しました: {} {}",
                    format_timestamp(record.timestamp()),
                    record.amount().map(format_amount).unwrap_or_default()
                );
            }
            print_total(store);
        }

        Commands::Config { .. } => {
            bail!("config は設定ファイルのみを扱います");
        }
    }

    Ok(())
}

/// 合計を表示（合計が計算できなくても一覧や削除は続ける）
fn print_total(store: &RecordStore<JsonFileStorage>) {
    match store.total() {
        Ok(total) => println!("合計: {}", format_amount(total)),
        Err(e) => println!("合計: 計算できません ({})", e),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "receipt_log=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
