use crate::camera::SequenceFallback;
use crate::metadata::{TagMap, TAG_COMPOSITE_FILE_NUMBER, TAG_MAKER_FILE_NUMBER};

/// カウンタが一周した瞬間だけ現れる値。実際のファイル名側は0001になる。
const WRAPPED_COUNTER: &str = "10000";

/// 撮影連番を解決する。優先順はComposite:FileNumber、
/// MakerNotes:FileNumber、最後にカメラごとのファイル名フォールバック。
/// どこにも無ければNone (連番なしで改名する)。
pub fn resolve_sequence(
    tags: &TagMap,
    base_name: &str,
    fallback: SequenceFallback,
) -> Option<String> {
    let raw = tags
        .get_str(TAG_COMPOSITE_FILE_NUMBER)
        .or_else(|| tags.get_str(TAG_MAKER_FILE_NUMBER))
        .map(|value| split_composite(&value))
        .or_else(|| match fallback {
            SequenceFallback::None => None,
            SequenceFallback::TrailingUnderscore => after_last_underscore(base_name),
            SequenceFallback::BurstMarkers => burst_suffix(base_name),
        });

    raw.map(|value| normalize(&value))
}

/// `100-9049` 形式はダッシュの後ろだけを使う。ダッシュ無しはそのまま。
fn split_composite(raw: &str) -> String {
    match raw.rsplit_once('-') {
        Some((_, tail)) if tail == WRAPPED_COUNTER => "0001".to_string(),
        Some((_, tail)) => tail.to_string(),
        None => raw.to_string(),
    }
}

fn after_last_underscore(base_name: &str) -> Option<String> {
    base_name
        .rsplit_once('_')
        .map(|(_, tail)| tail.to_string())
}

/// S7は連写や同秒複数枚のときだけ `_NNN` (3桁固定) か `(N)` を
/// ファイル名に付ける。`_NNN` を先に調べる。
fn burst_suffix(base_name: &str) -> Option<String> {
    if let Some((_, tail)) = base_name.rsplit_once('_') {
        if tail.len() == 3 && tail.bytes().all(|b| b.is_ascii_digit()) {
            return Some(tail.to_string());
        }
    }

    let (_, after_paren) = base_name.rsplit_once('(')?;
    let (inner, _) = after_paren.rsplit_once(')')?;
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        return Some(inner.to_string());
    }
    None
}

/// 4桁へ正規化する。先頭を0で埋め、長すぎる場合は末尾4文字を残す。
fn normalize(raw: &str) -> String {
    let padded = format!("{raw:0>4}");
    let chars: Vec<char> = padded.chars().collect();
    chars[chars.len() - 4..].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::resolve_sequence;
    use crate::camera::SequenceFallback;
    use crate::metadata::{TagMap, TAG_COMPOSITE_FILE_NUMBER, TAG_MAKER_FILE_NUMBER};
    use serde_json::json;

    fn composite(value: serde_json::Value) -> TagMap {
        let mut tags = TagMap::default();
        tags.insert(TAG_COMPOSITE_FILE_NUMBER, value);
        tags
    }

    #[test]
    fn composite_number_takes_part_after_dash() {
        let tags = composite(json!("101-0002"));
        assert_eq!(
            resolve_sequence(&tags, "IMG_0002", SequenceFallback::None).as_deref(),
            Some("0002")
        );

        let tags = composite(json!("100-9049"));
        assert_eq!(
            resolve_sequence(&tags, "IMG_9049", SequenceFallback::None).as_deref(),
            Some("9049")
        );
    }

    #[test]
    fn wrapped_counter_becomes_0001() {
        let tags = composite(json!("100-10000"));
        assert_eq!(
            resolve_sequence(&tags, "IMG_0001", SequenceFallback::None).as_deref(),
            Some("0001")
        );
    }

    #[test]
    fn dashless_number_keeps_last_four_digits() {
        // G1X2/G9のMakerNotes:FileNumberは4桁を超える
        let mut tags = TagMap::default();
        tags.insert(TAG_MAKER_FILE_NUMBER, json!(1011387));
        assert_eq!(
            resolve_sequence(&tags, "IMG_1387", SequenceFallback::None).as_deref(),
            Some("1387")
        );
    }

    #[test]
    fn short_number_is_zero_padded() {
        let tags = composite(json!("101-2"));
        assert_eq!(
            resolve_sequence(&tags, "IMG_0002", SequenceFallback::None).as_deref(),
            Some("0002")
        );
    }

    #[test]
    fn composite_wins_over_maker_notes() {
        let mut tags = TagMap::default();
        tags.insert(TAG_COMPOSITE_FILE_NUMBER, json!("100-9049"));
        tags.insert(TAG_MAKER_FILE_NUMBER, json!(1011387));
        assert_eq!(
            resolve_sequence(&tags, "IMG_9049", SequenceFallback::None).as_deref(),
            Some("9049")
        );
    }

    #[test]
    fn underscore_fallback_reads_base_name() {
        let tags = TagMap::default();
        assert_eq!(
            resolve_sequence(&tags, "MVI_7235", SequenceFallback::TrailingUnderscore).as_deref(),
            Some("7235")
        );
        assert_eq!(
            resolve_sequence(&tags, "IMG_20160514_104058", SequenceFallback::TrailingUnderscore)
                .as_deref(),
            Some("4058")
        );
        // アンダースコアが無ければ連番なし
        assert_eq!(
            resolve_sequence(&tags, "DSC00001", SequenceFallback::TrailingUnderscore),
            None
        );
    }

    #[test]
    fn no_fallback_means_no_sequence() {
        assert_eq!(
            resolve_sequence(&TagMap::default(), "MVI_7235", SequenceFallback::None),
            None
        );
    }

    #[test]
    fn burst_markers_check_three_digit_suffix_first() {
        let tags = TagMap::default();
        assert_eq!(
            resolve_sequence(&tags, "20170424_102638_001", SequenceFallback::BurstMarkers)
                .as_deref(),
            Some("0001")
        );
        // 3桁固定。4桁の時刻部分は連番とみなさない
        assert_eq!(
            resolve_sequence(&tags, "20170424_102638", SequenceFallback::BurstMarkers),
            None
        );
    }

    #[test]
    fn burst_markers_accept_parenthesized_number() {
        let tags = TagMap::default();
        assert_eq!(
            resolve_sequence(&tags, "20170424_102638(2)", SequenceFallback::BurstMarkers)
                .as_deref(),
            Some("0002")
        );
        assert_eq!(
            resolve_sequence(&tags, "20170424_102638(x)", SequenceFallback::BurstMarkers),
            None
        );
    }

    #[test]
    fn metadata_number_wins_over_base_name_fallback() {
        let tags = composite(json!("100-0841"));
        assert_eq!(
            resolve_sequence(&tags, "IMG_9999", SequenceFallback::TrailingUnderscore).as_deref(),
            Some("0841")
        );
    }
}
