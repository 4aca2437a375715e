use crate::camera::{CameraTable, UNKNOWN_MODEL};
use crate::exiftool::{read_metadata_batch, DEFAULT_EXIFTOOL};
use crate::metadata::{MediaRecord, TagMap, TAG_QT_DURATION};
use crate::naming::{dest_dir, dest_file_name};
use crate::sequence::resolve_sequence;
use crate::timestamp::{apply_skew, resolve_capture_time, subtract_duration, Skew};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use walkdir::WalkDir;

pub const SIDECAR_EXT: &str = "THM";

/// G9のAVIは本体にメタデータが無く、THM側の処理で改名される。
const DISALLOWED_EXTS: &[&str] = &["AVI"];

#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub inputs: Vec<PathBuf>,
    pub exiftool: PathBuf,
    pub skew: Skew,
    pub camera_override: Option<String>,
    pub parent_dir: Option<PathBuf>,
    pub dated_subdir: bool,
    pub camera_table: CameraTable,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            exiftool: PathBuf::from(DEFAULT_EXIFTOOL),
            skew: Skew::default(),
            camera_override: None,
            parent_dir: None,
            dated_subdir: true,
            camera_table: CameraTable::builtin(),
        }
    }
}

/// ファイルを除外した理由。すべて該当ファイル限りで、バッチは継続する。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SkipReason {
    #[error("ファイル名を取得できませんでした")]
    MissingBaseName,
    #[error("拡張子がありません")]
    MissingExtension,
    #[error("対象外の拡張子です: {0}")]
    DisallowedExtension(String),
    #[error("未知のカメラモデルです: {0:?}")]
    UnknownModel(Option<String>),
    #[error("日時情報は{0}サイドカー側から取得します")]
    SidecarDriven(String),
    #[error("撮影日時を取得できませんでした")]
    MissingTimestamp,
    #[error("動画の長さ({0})を取得できませんでした")]
    MissingDuration(String),
    #[error("GMT記録の動画にはスキュー指定が必要です")]
    SkewRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCandidate {
    pub source_path: PathBuf,
    pub dest_dir: PathBuf,
    pub dest_file: String,
    pub record: MediaRecord,
    /// サイドカーから導出した改名かどうか
    pub from_sidecar: bool,
}

impl RenameCandidate {
    pub fn target_path(&self) -> PathBuf {
        self.dest_dir.join(&self.dest_file)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub source_path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameStats {
    pub inputs: usize,
    pub planned: usize,
    pub companions: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePlan {
    pub candidates: Vec<RenameCandidate>,
    pub skipped: Vec<SkippedFile>,
    pub stats: RenameStats,
    /// exiftoolが返した全タグ。-v時の診断ダンプに使う。
    pub metadata: Vec<TagMap>,
}

/// 入力を展開し、メタデータを一括取得して改名計画を作る。
/// ここまでファイルシステムへの書き込みは一切行わない。
pub fn generate_plan(options: &PlanOptions) -> Result<RenamePlan> {
    let files = collect_input_files(&options.inputs)?;
    let metadata = read_metadata_batch(&options.exiftool, &files)?;
    Ok(plan_from_metadata(options, metadata))
}

/// 入力のディレクトリは展開し、最後に全体をパスでソートする。
/// サイドカーと本体の動画が隣接して処理されるのはこのソートに依る。
pub fn collect_input_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("フォルダ走査に失敗しました: {}", input.display()))?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files.sort();
    Ok(files)
}

/// 取得済みメタデータから計画を組み立てる純粋な決定ロジック。
pub fn plan_from_metadata(options: &PlanOptions, metadata: Vec<TagMap>) -> RenamePlan {
    let mut candidates = Vec::new();
    let mut skipped = Vec::new();
    let mut stats = RenameStats {
        inputs: metadata.len(),
        ..RenameStats::default()
    };

    for tags in &metadata {
        match resolve_record(options, tags) {
            Ok(record) => push_candidates(options, record, &mut candidates, &mut stats),
            Err(reason) => {
                skipped.push(SkippedFile {
                    source_path: tags.source_file().unwrap_or_default(),
                    reason,
                });
                stats.skipped += 1;
            }
        }
    }

    RenamePlan {
        candidates,
        skipped,
        stats,
        metadata,
    }
}

fn resolve_record(options: &PlanOptions, tags: &TagMap) -> Result<MediaRecord, SkipReason> {
    let source_path = tags.source_file().ok_or(SkipReason::MissingBaseName)?;

    let base_name = source_path
        .file_stem()
        .and_then(|v| v.to_str())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingBaseName)?;
    let extension = source_path
        .extension()
        .and_then(|v| v.to_str())
        .map(str::to_string)
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingExtension)?;

    let ext_upper = extension.to_ascii_uppercase();
    if DISALLOWED_EXTS.contains(&ext_upper.as_str()) {
        return Err(SkipReason::DisallowedExtension(extension));
    }

    // モデルタグは以降のカメラ別分岐が参照するため最初に確定させる
    let (model_exif, model_mapped) = match &options.camera_override {
        Some(tag) => (None, tag.clone()),
        None => options.camera_table.resolve(tags),
    };
    if model_mapped == UNKNOWN_MODEL {
        return Err(SkipReason::UnknownModel(model_exif));
    }
    let policy = options.camera_table.policy(&model_mapped);

    if policy.skip_video_ext.as_deref() == Some(ext_upper.as_str()) {
        return Err(SkipReason::SidecarDriven(SIDECAR_EXT.to_string()));
    }

    let taken = resolve_capture_time(tags).ok_or(SkipReason::MissingTimestamp)?;
    let sequence = resolve_sequence(tags, &base_name, policy.seq_fallback);

    let mut taken = apply_skew(taken, &options.skew);
    if policy.duration_video_ext.as_deref() == Some(ext_upper.as_str()) {
        let duration = tags
            .get_f64(TAG_QT_DURATION)
            .ok_or_else(|| SkipReason::MissingDuration(TAG_QT_DURATION.to_string()))?;
        taken = subtract_duration(taken, duration);
    }

    if policy.gmt_video_ext.as_deref() == Some(ext_upper.as_str()) && !options.skew.is_set() {
        return Err(SkipReason::SkewRequired);
    }

    Ok(MediaRecord {
        source_path,
        base_name,
        extension,
        model_exif,
        model_mapped,
        taken,
        sequence,
    })
}

/// 解決済みレコードを改名候補へ変換する。THMサイドカーは本体動画の
/// 改名候補を先に積んでから自身の候補を積む。
fn push_candidates(
    options: &PlanOptions,
    record: MediaRecord,
    candidates: &mut Vec<RenameCandidate>,
    stats: &mut RenameStats,
) {
    let dir = dest_dir(&record, options.parent_dir.as_deref(), options.dated_subdir);

    if record.extension.eq_ignore_ascii_case(SIDECAR_EXT) {
        let policy = options.camera_table.policy(&record.model_mapped);
        if let Some(video_ext) = policy.sidecar_video_ext {
            let derived = record.companion(&video_ext);
            candidates.push(RenameCandidate {
                source_path: derived.source_path.clone(),
                dest_dir: dir.clone(),
                dest_file: dest_file_name(&derived),
                record: derived,
                from_sidecar: true,
            });
            stats.companions += 1;
        }
    }

    candidates.push(RenameCandidate {
        source_path: record.source_path.clone(),
        dest_dir: dir,
        dest_file: dest_file_name(&record),
        record,
        from_sidecar: false,
    });
    stats.planned += 1;
}
