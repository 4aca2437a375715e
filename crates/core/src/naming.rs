use crate::metadata::MediaRecord;
use chrono::{Datelike, Timelike};
use std::path::{Path, PathBuf};

/// 移動先ディレクトリを組み立てる。書式は `[親ディレクトリ/][YYYYMMDD/]`。
/// どちらも省略可能で、両方省略するとカレントディレクトリ相対になる。
pub fn dest_dir(record: &MediaRecord, parent_dir: Option<&Path>, dated_subdir: bool) -> PathBuf {
    let mut dir = parent_dir.map(Path::to_path_buf).unwrap_or_default();
    if dated_subdir {
        let t = record.taken;
        dir.push(format!("{:02}{:02}{:02}", t.year(), t.month(), t.day()));
    }
    dir
}

/// 移動先ファイル名を組み立てる。書式は
/// `YYYYMMDD_HH_MM_SS_モデルタグ[_連番].拡張子` で、連番が無ければ省略する。
/// `{:02}` は最小幅指定なので4桁の年はそのまま4桁で出る。
pub fn dest_file_name(record: &MediaRecord) -> String {
    let t = record.taken;
    let mut name = format!(
        "{:02}{:02}{:02}_{:02}_{:02}_{:02}_{}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second(),
        record.model_mapped
    );

    if let Some(sequence) = &record.sequence {
        name.push('_');
        name.push_str(sequence);
    }

    name.push('.');
    name.push_str(&record.extension);
    name
}

#[cfg(test)]
mod tests {
    use super::{dest_dir, dest_file_name};
    use crate::metadata::MediaRecord;
    use chrono::NaiveDate;
    use std::path::{Path, PathBuf};

    fn record(sequence: Option<&str>) -> MediaRecord {
        MediaRecord {
            source_path: PathBuf::from("/cards/MVI_7235.MOV"),
            base_name: "MVI_7235".to_string(),
            extension: "MOV".to_string(),
            model_exif: Some("Canon EOS 5D Mark II".to_string()),
            model_mapped: "5DM2".to_string(),
            taken: NaiveDate::from_ymd_opt(2016, 5, 12)
                .unwrap()
                .and_hms_opt(6, 13, 4)
                .unwrap(),
            sequence: sequence.map(str::to_string),
        }
    }

    #[test]
    fn file_name_without_sequence() {
        assert_eq!(dest_file_name(&record(None)), "20160512_06_13_04_5DM2.MOV");
    }

    #[test]
    fn file_name_with_sequence() {
        assert_eq!(
            dest_file_name(&record(Some("7235"))),
            "20160512_06_13_04_5DM2_7235.MOV"
        );
    }

    #[test]
    fn year_renders_four_digits_despite_two_digit_directive() {
        // 最小幅2の書式でも4桁の年は切り詰められない
        let name = dest_file_name(&record(None));
        assert!(name.starts_with("2016"));
        let dir = dest_dir(&record(None), None, true);
        assert_eq!(dir, PathBuf::from("20160512"));
    }

    #[test]
    fn dir_combines_parent_and_dated_subdir() {
        let r = record(None);
        assert_eq!(
            dest_dir(&r, Some(Path::new("/sorted")), true),
            PathBuf::from("/sorted/20160512")
        );
        assert_eq!(
            dest_dir(&r, Some(Path::new("/sorted")), false),
            PathBuf::from("/sorted")
        );
        assert_eq!(dest_dir(&r, None, false), PathBuf::new());
    }

    #[test]
    fn single_digit_fields_are_zero_padded() {
        let mut r = record(None);
        r.taken = NaiveDate::from_ymd_opt(2008, 5, 18)
            .unwrap()
            .and_hms_opt(1, 2, 3)
            .unwrap();
        r.model_mapped = "G9".to_string();
        r.extension = "CR2".to_string();
        assert_eq!(dest_file_name(&r), "20080518_01_02_03_G9.CR2");
    }
}
