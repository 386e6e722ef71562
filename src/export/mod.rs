//! テキストファイル出力

use crate::error::{PartNumError, Result};
use partnum_common::{export_file_name, serialize_records, PartRecord};
use std::path::{Path, PathBuf};
use tracing::info;

/// 出力先がフォルダ（または拡張子なし）ならファイル名を付ける
fn output_path(output: &Path, date: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(export_file_name(date))
    } else {
        output.to_path_buf()
    }
}

pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PartNumError::Export(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, content)
        .map_err(|e| PartNumError::Export(format!("{}: {}", path.display(), e)))
}

/// レコード一覧を書き出し、書き出したパスを返す
///
/// `date` は `YYYY-MM-DD`。
pub fn export_records(records: &[PartRecord], output: &Path, date: &str) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(PartNumError::Export("내보낼 품번이 없습니다".into()));
    }
    let path = output_path(output, date);
    write_text_file(&path, &serialize_records(records))?;
    info!(path = %path.display(), count = records.len(), "records exported");
    Ok(path)
}

/// 今日の日付（ローカル）
pub fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}
