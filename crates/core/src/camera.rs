use crate::metadata::{TagMap, TAG_MODEL, TAG_QT_COMPRESSOR, TAG_QT_MODEL};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UNKNOWN_MODEL: &str = "UNKNOWN";

/// メタデータに連番が無いとき、ファイル名のどこから拾うか。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceFallback {
    #[default]
    None,
    /// 最後のアンダースコア以降を連番とみなす (Canon系・iPhone)
    TrailingUnderscore,
    /// 末尾の `_NNN` (3桁固定) か `(N)` を連番とみなす (Galaxy S7の連写)
    BurstMarkers,
}

/// カメラタグ1つ分の癖をまとめたレコード。拡張子はすべて大文字で保持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraPolicy {
    pub seq_fallback: SequenceFallback,
    /// THMサイドカーが代理する動画の拡張子 (MOV / AVI)
    pub sidecar_video_ext: Option<String>,
    /// 本体に日時が無く、THM側から改名する動画の拡張子
    pub skip_video_ext: Option<String>,
    /// タイムスタンプがGMTで記録され、スキュー指定を必須とする動画の拡張子
    pub gmt_video_ext: Option<String>,
    /// タイムスタンプが録画終了時刻で、長さを差し引く動画の拡張子
    pub duration_video_ext: Option<String>,
}

/// 起動時に1度だけ構築する不変のカメラ対応表。
/// 生のモデル文字列から短縮タグへの対応と、タグごとのポリシーを持つ。
#[derive(Debug, Clone)]
pub struct CameraTable {
    models: HashMap<String, String>,
    policies: HashMap<String, CameraPolicy>,
}

impl Default for CameraTable {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_MODELS: &[(&str, &str)] = &[
    ("Canon EOS 5D Mark II", "5DM2"),
    ("Canon EOS 7D", "7D"),
    ("Canon EOS 7D Mark II", "7DM2"),
    ("Canon PowerShot G1 X Mark II", "G1X2"),
    ("Canon PowerShot G9", "G9"),
    ("Canon EOS M", "EOSM"),
    // GoPro Hero 2は動画と静止画でモデル名の出どころが違う
    ("GoPro AVC encoder", "GPRO"),
    ("YHDC5170", "GPRO"),
    // 歴史的経緯でS2ではなくI500
    ("SCH-I500", "I500"),
    ("SCH-I545", "S4"),
    ("SM-G930V", "S7"),
    ("FinePix4700 ZOOM", "FP4700"),
    ("DMC-ZS25", "ZS25"),
    ("iPhone 6", "IPHONE6"),
];

const TRAILING_UNDERSCORE_TAGS: &[&str] =
    &["5DM2", "7D", "7DM2", "G1X2", "G9", "EOSM", "IPHONE6"];

impl CameraTable {
    pub fn builtin() -> Self {
        let models = BUILTIN_MODELS
            .iter()
            .map(|(raw, tag)| (raw.to_string(), tag.to_string()))
            .collect::<HashMap<_, _>>();

        let mut policies = HashMap::<String, CameraPolicy>::new();
        for tag in TRAILING_UNDERSCORE_TAGS {
            policies.entry(tag.to_string()).or_default().seq_fallback =
                SequenceFallback::TrailingUnderscore;
        }
        for tag in ["5DM2", "7D"] {
            let policy = policies.entry(tag.to_string()).or_default();
            policy.sidecar_video_ext = Some("MOV".to_string());
            policy.skip_video_ext = Some("MOV".to_string());
        }
        {
            let policy = policies.entry("G9".to_string()).or_default();
            policy.sidecar_video_ext = Some("AVI".to_string());
        }
        {
            let policy = policies.entry("S7".to_string()).or_default();
            policy.seq_fallback = SequenceFallback::BurstMarkers;
            policy.gmt_video_ext = Some("MP4".to_string());
            policy.duration_video_ext = Some("MP4".to_string());
        }
        {
            let policy = policies.entry("S4".to_string()).or_default();
            policy.gmt_video_ext = Some("MP4".to_string());
        }

        CameraTable { models, policies }
    }

    /// 設定ファイル由来の追加分を組み込む。同名は設定側を優先する。
    pub fn extend(
        &mut self,
        models: &HashMap<String, String>,
        policies: &HashMap<String, CameraPolicy>,
    ) {
        for (raw, tag) in models {
            self.models.insert(raw.clone(), tag.clone());
        }
        for (tag, policy) in policies {
            self.policies.insert(tag.clone(), policy.clone());
        }
    }

    pub fn map_model(&self, raw: &str) -> String {
        self.models
            .get(raw)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string())
    }

    /// メタデータからモデル名を引き、短縮タグへ変換する。
    /// 5DM2のMOVはQuickTime:Model、GoPro Hero 2の動画は
    /// QuickTime:CompressorNameにしかモデル名が入らない。
    pub fn resolve(&self, tags: &TagMap) -> (Option<String>, String) {
        let raw = tags
            .get_str(TAG_MODEL)
            .or_else(|| tags.get_str(TAG_QT_MODEL))
            .or_else(|| tags.get_str(TAG_QT_COMPRESSOR));

        let mapped = raw
            .as_deref()
            .map(|r| self.map_model(r))
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

        (raw, mapped)
    }

    pub fn policy(&self, tag: &str) -> CameraPolicy {
        self.policies.get(tag).cloned().unwrap_or_default()
    }
}
