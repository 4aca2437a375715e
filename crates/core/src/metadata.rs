use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

pub const TAG_SOURCE_FILE: &str = "SourceFile";
pub const TAG_MODEL: &str = "EXIF:Model";
pub const TAG_QT_MODEL: &str = "QuickTime:Model";
pub const TAG_QT_COMPRESSOR: &str = "QuickTime:CompressorName";
pub const TAG_DATETIME_ORIGINAL: &str = "EXIF:DateTimeOriginal";
pub const TAG_QT_CREATE_DATE: &str = "QuickTime:MediaCreateDate";
pub const TAG_QT_DURATION: &str = "QuickTime:Duration";
pub const TAG_COMPOSITE_FILE_NUMBER: &str = "Composite:FileNumber";
pub const TAG_MAKER_FILE_NUMBER: &str = "MakerNotes:FileNumber";

/// exiftoolが返した1ファイル分のタグ一覧。キーはグループ付きタグ名。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(HashMap<String, Value>);

impl TagMap {
    pub fn insert(&mut self, tag: impl Into<String>, value: Value) {
        self.0.insert(tag.into(), value);
    }

    pub fn source_file(&self) -> Option<PathBuf> {
        self.get_str(TAG_SOURCE_FILE).map(PathBuf::from)
    }

    /// 文字列タグを取得する。数値タグも文字列表現へ変換する。
    pub fn get_str(&self, tag: &str) -> Option<String> {
        match self.0.get(tag)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get_f64(&self, tag: &str) -> Option<f64> {
        let value = self.0.get(tag)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
    }

    /// 診断出力用。キー順で安定させる。
    pub fn sorted_entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<(&str, &Value)> =
            self.0.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

impl FromIterator<(String, Value)> for TagMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        TagMap(iter.into_iter().collect())
    }
}

/// 1入力ファイル分の解決結果。毎ファイル新規に構築し、使い回さない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    pub source_path: PathBuf,
    pub base_name: String,
    pub extension: String,
    pub model_exif: Option<String>,
    pub model_mapped: String,
    pub taken: NaiveDateTime,
    pub sequence: Option<String>,
}

impl MediaRecord {
    pub fn extension_uppercase(&self) -> String {
        self.extension.to_ascii_uppercase()
    }

    /// サイドカーから導出する別レコード。日時・モデル・連番を引き継ぎ、
    /// パスと拡張子だけを同名の動画ファイルへ差し替える。親は変更しない。
    pub fn companion(&self, video_ext: &str) -> MediaRecord {
        let mut derived = self.clone();
        derived.source_path = self.source_path.with_extension(video_ext);
        derived.extension = video_ext.to_string();
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaRecord, TagMap, TAG_QT_DURATION, TAG_SOURCE_FILE};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn record() -> MediaRecord {
        MediaRecord {
            source_path: PathBuf::from("/cards/MVI_7235.THM"),
            base_name: "MVI_7235".to_string(),
            extension: "THM".to_string(),
            model_exif: Some("Canon EOS 5D Mark II".to_string()),
            model_mapped: "5DM2".to_string(),
            taken: NaiveDate::from_ymd_opt(2016, 5, 12)
                .unwrap()
                .and_hms_opt(6, 13, 4)
                .unwrap(),
            sequence: Some("7235".to_string()),
        }
    }

    #[test]
    fn get_str_converts_numbers() {
        let tags: TagMap = [("MakerNotes:FileNumber".to_string(), json!(1011387))]
            .into_iter()
            .collect();
        assert_eq!(
            tags.get_str("MakerNotes:FileNumber").as_deref(),
            Some("1011387")
        );
    }

    #[test]
    fn get_f64_accepts_numeric_strings() {
        let mut tags = TagMap::default();
        tags.insert(TAG_QT_DURATION, Value::String("21.013".to_string()));
        assert_eq!(tags.get_f64(TAG_QT_DURATION), Some(21.013));

        tags.insert(TAG_QT_DURATION, json!(20.792));
        assert_eq!(tags.get_f64(TAG_QT_DURATION), Some(20.792));
    }

    #[test]
    fn source_file_is_read_as_path() {
        let mut tags = TagMap::default();
        tags.insert(TAG_SOURCE_FILE, json!("/cards/IMG_0001.CR2"));
        assert_eq!(
            tags.source_file(),
            Some(PathBuf::from("/cards/IMG_0001.CR2"))
        );
    }

    #[test]
    fn companion_swaps_path_and_extension_only() {
        let parent = record();
        let derived = parent.companion("MOV");

        assert_eq!(derived.source_path, PathBuf::from("/cards/MVI_7235.MOV"));
        assert_eq!(derived.extension, "MOV");
        assert_eq!(derived.base_name, parent.base_name);
        assert_eq!(derived.taken, parent.taken);
        assert_eq!(derived.model_mapped, parent.model_mapped);
        assert_eq!(derived.sequence, parent.sequence);
        // 親レコードは変更されない
        assert_eq!(parent.extension, "THM");
    }
}
