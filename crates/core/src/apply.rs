use crate::planner::{RenameCandidate, RenamePlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// 候補1件の適用結果。失敗はその候補限りで、続くファイルの処理は止めない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    Renamed,
    /// プレビューのみ。ファイルシステムには触れていない。
    Previewed,
    /// 移動先が既に存在する。上書きはせず、元ファイルも動かさない。
    DestinationExists,
    DirCreateFailed(String),
    MoveFailed(String),
}

impl ApplyOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::DirCreateFailed(_) | ApplyOutcome::MoveFailed(_)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedCandidate {
    pub source_path: PathBuf,
    pub target_path: PathBuf,
    pub outcome: ApplyOutcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub outcomes: Vec<AppliedCandidate>,
    pub renamed: usize,
    pub skipped_existing: usize,
    pub failed: usize,
}

/// 計画を候補順に適用する。候補ごとに完結し、途中で失敗しても
/// 巻き戻しはしない (再実行すれば残りだけが対象になる)。
pub fn apply_plan(plan: &RenamePlan, preview: bool) -> ApplyResult {
    let mut result = ApplyResult::default();
    for candidate in &plan.candidates {
        let outcome = apply_candidate(candidate, preview);
        match &outcome {
            ApplyOutcome::Renamed | ApplyOutcome::Previewed => result.renamed += 1,
            ApplyOutcome::DestinationExists => result.skipped_existing += 1,
            _ => result.failed += 1,
        }
        result.outcomes.push(AppliedCandidate {
            source_path: candidate.source_path.clone(),
            target_path: candidate.target_path(),
            outcome,
        });
    }
    result
}

fn apply_candidate(candidate: &RenameCandidate, preview: bool) -> ApplyOutcome {
    let target = candidate.target_path();

    if preview {
        // 読み取りのみ。意図の報告に留める。
        if target.exists() {
            return ApplyOutcome::DestinationExists;
        }
        return ApplyOutcome::Previewed;
    }

    if !candidate.dest_dir.as_os_str().is_empty() {
        if let Err(err) = fs::create_dir_all(&candidate.dest_dir) {
            return ApplyOutcome::DirCreateFailed(err.to_string());
        }
    }

    if target.exists() {
        return ApplyOutcome::DestinationExists;
    }

    match fs::rename(&candidate.source_path, &target) {
        Ok(()) => ApplyOutcome::Renamed,
        Err(err) => ApplyOutcome::MoveFailed(err.to_string()),
    }
}
