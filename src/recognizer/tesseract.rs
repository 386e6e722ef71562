//! tesseract CLI 連携
//!
//! 画像と設定ファイルを一時ファイルに書き出し、TSV出力を行単位に組み立てる。

use super::{OcrEngine, OcrOutput, OcrRequest, ProgressFn, RecognitionConfig};
use crate::error::{PartNumError, Result};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

/// TSV の word レベル
const WORD_LEVEL: u32 = 5;

#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// `tesseract --version` の1行目
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .await
            .map_err(|e| PartNumError::Recognition(format!("{} 실행 실패: {}", self.command, e)))?;
        let text = String::from_utf8_lossy(&output.stdout).to_string();
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }
}

/// 引数長の制限を避けるため、設定は一時ファイルで渡す
fn write_config_file(config: &RecognitionConfig) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("partnum-")
        .suffix(".cfg")
        .tempfile()?;
    writeln!(file, "tessedit_char_whitelist {}", config.char_whitelist)?;
    writeln!(file, "preserve_interword_spaces {}", u8::from(config.preserve_interword_spaces))?;
    writeln!(file, "textord_heavy_nr {}", u8::from(config.noise_reduction))?;
    file.flush()?;
    Ok(file)
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(
        &self,
        image: &DynamicImage,
        request: &OcrRequest,
        progress: ProgressFn<'_>,
    ) -> Result<OcrOutput> {
        progress(0.0);
        let input = tempfile::Builder::new()
            .prefix("partnum-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), ImageFormat::Png)?;
        let config_file = write_config_file(&request.config)?;
        progress(0.2);

        let output = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&request.language)
            .arg("--oem")
            .arg(request.config.ocr_engine_mode.to_string())
            .arg("--psm")
            .arg(request.config.page_seg_mode.to_string())
            .arg(config_file.path())
            .arg("tsv")
            .output()
            .await
            .map_err(|e| PartNumError::Recognition(format!("{} 실행 실패: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PartNumError::Recognition(format!(
                "tesseract failed (code {:?}): {}",
                output.status.code(),
                stderr.trim()
            )));
        }
        progress(0.9);

        let tsv = String::from_utf8_lossy(&output.stdout);
        debug!(bytes = tsv.len(), "tesseract tsv received");
        let parsed = parse_tsv(&tsv);
        progress(1.0);
        Ok(parsed)
    }
}

/// TSV を行テキストと平均信頼度に変換
///
/// 列: level page_num block_num par_num line_num word_num left top width height conf text
pub fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut lines: Vec<((u32, u32, u32, u32), Vec<String>)> = Vec::new();
    let mut confidences = Vec::new();

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 11 {
            continue;
        }
        let num = |i: usize| cols[i].trim().parse::<u32>().unwrap_or(0);
        if num(0) != WORD_LEVEL {
            continue;
        }
        let text = cols.get(11).map(|t| t.trim()).unwrap_or("");
        if text.is_empty() {
            continue;
        }
        if let Ok(conf) = cols[10].trim().parse::<f32>() {
            if conf >= 0.0 {
                confidences.push(conf);
            }
        }

        let key = (num(1), num(2), num(3), num(4));
        match lines.last_mut() {
            Some((last, words)) if *last == key => words.push(text.to_string()),
            _ => lines.push((key, vec![text.to_string()])),
        }
    }

    let confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };

    OcrOutput {
        text: lines
            .into_iter()
            .map(|(_, words)| words.join(" "))
            .collect::<Vec<_>>()
            .join("\n"),
        confidence,
    }
}
