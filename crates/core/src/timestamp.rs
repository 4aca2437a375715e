use crate::metadata::{TagMap, TAG_DATETIME_ORIGINAL, TAG_QT_CREATE_DATE};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// カメラの時計ずれやタイムゾーン違いを補正するユーザー指定のオフセット。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skew {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Skew {
    pub fn is_set(&self) -> bool {
        self.days != 0 || self.hours != 0 || self.minutes != 0 || self.seconds != 0
    }

    fn as_duration(&self) -> Duration {
        Duration::seconds(
            self.seconds + self.minutes * 60 + self.hours * 3_600 + self.days * 86_400,
        )
    }
}

/// 撮影日時を解決する。EXIF:DateTimeOriginalを優先し、
/// 無ければQuickTime:MediaCreateDate (GoPro等の動画) を読む。
/// どちらも無い、または書式が合わない場合はNone。
pub fn resolve_capture_time(tags: &TagMap) -> Option<NaiveDateTime> {
    let raw = tags
        .get_str(TAG_DATETIME_ORIGINAL)
        .or_else(|| tags.get_str(TAG_QT_CREATE_DATE))?;
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT).ok()
}

pub fn apply_skew(taken: NaiveDateTime, skew: &Skew) -> NaiveDateTime {
    taken + skew.as_duration()
}

/// 録画終了時刻で記録された動画のタイムスタンプを録画開始時刻へ戻す。
/// 長さは秒 (小数あり) で渡される。
pub fn subtract_duration(taken: NaiveDateTime, duration_secs: f64) -> NaiveDateTime {
    taken - Duration::milliseconds((duration_secs * 1000.0).round() as i64)
}
