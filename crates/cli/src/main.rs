use anyhow::Result;
use camshot_renamer_core::{
    app_paths, apply_plan, generate_plan, load_config, ApplyOutcome, ApplyResult, CameraTable,
    PlanOptions, RenamePlan, Skew,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "camshot-renamer-cli")]
#[command(about = "撮影メタデータで写真・動画ファイルを一括リネームします")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Rename(RenameArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    Show,
}

#[derive(Debug, Args)]
struct RenameArgs {
    /// exiftool実行ファイルの場所 (未指定なら設定ファイル、次にPATH)
    #[arg(long)]
    exiftool: Option<PathBuf>,
    /// 撮影日時に加える補正 (日)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    skewd: i64,
    /// 撮影日時に加える補正 (時)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    skewh: i64,
    /// 撮影日時に加える補正 (分)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    skewm: i64,
    /// 撮影日時に加える補正 (秒)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    skews: i64,
    /// モデル解決を行わず、この短縮タグを全ファイルに使う
    #[arg(long)]
    camera: Option<String>,
    /// 解決したメタデータを全件ダンプする
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// 改名せず計画の表示のみ行う
    #[arg(short, long, default_value_t = false)]
    preview: bool,
    /// 移動先の親ディレクトリ
    #[arg(long)]
    parentdir: Option<PathBuf>,
    /// 日付サブディレクトリ (YYYYMMDD) を作らない
    #[arg(long, default_value_t = false)]
    nosubdir: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    /// 対象のファイルまたはフォルダ
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rename(args) => cmd_rename(args),
        Commands::Config(config) => match config.action {
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

fn cmd_rename(args: RenameArgs) -> Result<()> {
    let config = load_config()?;

    let mut camera_table = CameraTable::builtin();
    camera_table.extend(&config.camera_models, &config.camera_policies);

    let preview = args.preview || config.preview_default;
    let options = PlanOptions {
        inputs: args.inputs,
        exiftool: args
            .exiftool
            .unwrap_or_else(|| PathBuf::from(&config.exiftool)),
        skew: Skew {
            days: args.skewd,
            hours: args.skewh,
            minutes: args.skewm,
            seconds: args.skews,
        },
        camera_override: args.camera,
        parent_dir: args.parentdir,
        dated_subdir: !args.nosubdir,
        camera_table,
    };

    let plan = generate_plan(&options)?;

    if args.verbose {
        print_metadata_dump(&plan);
    }

    let result = apply_plan(&plan, preview);

    match args.output {
        OutputFormat::Json => {
            let body = serde_json::json!({ "plan": plan, "apply": result });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => {
            print_table(&plan, &result);
        }
    }

    if preview {
        eprintln!("プレビューモード: 実ファイルは変更していません。適用するには -p を外してください。");
    } else {
        eprintln!(
            "適用完了: {}件 (既存のためスキップ {}件, 失敗 {}件)",
            result.renamed, result.skipped_existing, result.failed
        );
    }

    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let paths = app_paths()?;
    println!("設定ファイル: {}", paths.config_path.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn print_metadata_dump(plan: &RenamePlan) {
    for tags in &plan.metadata {
        println!(
            "== {}",
            tags.source_file().unwrap_or_default().display()
        );
        for (tag, value) in tags.sorted_entries() {
            println!("  {tag} = {value}");
        }
    }
}

fn print_table(plan: &RenamePlan, result: &ApplyResult) {
    for skipped in &plan.skipped {
        println!(
            "スキップ: {} ({})",
            skipped.source_path.display(),
            skipped.reason
        );
    }

    println!("元ファイル -> 新ファイル");
    for applied in &result.outcomes {
        let note = match &applied.outcome {
            ApplyOutcome::Renamed | ApplyOutcome::Previewed => String::new(),
            ApplyOutcome::DestinationExists => " [移動先が既に存在するため中止]".to_string(),
            ApplyOutcome::DirCreateFailed(err) => {
                format!(" [ディレクトリ作成失敗: {err}]")
            }
            ApplyOutcome::MoveFailed(err) => format!(" [移動失敗: {err}]"),
        };
        println!(
            "{} -> {}{}",
            applied.source_path.display(),
            applied.target_path.display(),
            note
        );
    }

    println!(
        "\n集計: inputs={} planned={} companions={} skipped={} renamed={} exists={} failed={}",
        plan.stats.inputs,
        plan.stats.planned,
        plan.stats.companions,
        plan.stats.skipped,
        result.renamed,
        result.skipped_existing,
        result.failed
    );
}
