use chrono::NaiveDateTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF の日時表記（"2024:01:15 10:30:00"）
const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 撮影日時（`YYYY-MM-DD HH:MM:SS`）
pub fn extract_date(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut bufreader)?;

    for tag in [exif::Tag::DateTimeOriginal, exif::Tag::DateTime] {
        if let Some(field) = exif.get_field(tag, exif::In::PRIMARY) {
            let normalized = match field.value {
                exif::Value::Ascii(ref values) => values
                    .first()
                    .and_then(|raw| std::str::from_utf8(raw).ok())
                    .and_then(normalize_timestamp),
                _ => None,
            };
            return Ok(normalized.unwrap_or_else(|| field.display_value().to_string()));
        }
    }

    Err("No date found in EXIF".into())
}

/// EXIF 表記を表示用に変換。解釈できなければ None
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(raw, EXIF_FORMAT)
        .ok()
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
}
