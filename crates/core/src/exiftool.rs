use crate::metadata::TagMap;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_EXIFTOOL: &str = "exiftool";

/// 全入力ファイルのメタデータを1回のexiftool呼び出しでまとめて取得する。
/// 入力が多いと時間がかかるが、呼び出し回数はここで1回に抑える。
pub fn read_metadata_batch(tool: &Path, files: &[PathBuf]) -> Result<Vec<TagMap>> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let output = Command::new(tool)
        .arg("-j")
        .arg("-G")
        .arg("-n")
        .args(files)
        .output()
        .with_context(|| format!("exiftoolを起動できませんでした: {}", tool.display()))?;

    // exiftoolは一部ファイルの読み取りに失敗しても残りをJSONで返し、
    // 終了コードだけ非0にする。標準出力が空のときのみ全体失敗とみなす。
    if output.stdout.is_empty() {
        anyhow::bail!(
            "exiftoolが失敗しました ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let batches = serde_json::from_slice::<Vec<TagMap>>(&output.stdout)
        .context("exiftoolのJSON出力を解析できませんでした")?;
    Ok(batches)
}
