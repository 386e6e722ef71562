//! テキスト出力の整形
//!
//! 1レコード1行: `<品番> <数量><単位>`、有効期限があれば ` (유통기한 <YYYYMMDD>)` を付加

use crate::types::PartRecord;

/// 有効期限の表記
pub const EXPIRY_LABEL: &str = "유통기한";

pub fn serialize_record(record: &PartRecord) -> String {
    let mut line = format!("{} {}{}", record.number, record.quantity, record.unit);
    if !record.expiry_date.is_empty() {
        line.push_str(&format!(" ({} {})", EXPIRY_LABEL, record.expiry_date));
    }
    line
}

/// 一覧順（挿入順）で出力
pub fn serialize_records(records: &[PartRecord]) -> String {
    records
        .iter()
        .map(serialize_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// 出力ファイル名: `partnumbers_<YYYY-MM-DD>.txt`
pub fn export_file_name(date: &str) -> String {
    format!("partnumbers_{}.txt", date)
}
