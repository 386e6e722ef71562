//! 文字認識の呼び出し
//!
//! 1. 選択範囲があれば切り出す
//! 2. 固定の認識設定でエンジンを呼ぶ
//! 3. 生テキストを整形して行に分割する

pub mod crop;
mod tesseract;

pub use tesseract::{parse_tsv, TesseractCli};

use crate::error::{PartNumError, Result};
use async_trait::async_trait;
use image::DynamicImage;
use partnum_common::{recognized_lines, CapturedImage, RecognizedText, SelectionRect};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

/// 認識モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecognitionMode {
    #[default]
    Standard,
    /// 高度な設定で再試行（英大文字+数字のみ）
    Advanced,
}

/// エンジンに渡す認識設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub char_whitelist: String,
    /// 6 = 均一なテキストブロック
    pub page_seg_mode: u8,
    /// 1 = LSTM
    pub ocr_engine_mode: u8,
    pub preserve_interword_spaces: bool,
    pub noise_reduction: bool,
}

const DIGITS: &str = "0123456789";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

impl RecognitionConfig {
    /// 数字・英字・ハングル音節
    pub fn standard() -> Self {
        let mut whitelist = format!("{}{}{}", DIGITS, UPPER, LOWER);
        whitelist.extend('\u{AC00}'..='\u{D7A3}');
        Self {
            char_whitelist: whitelist,
            page_seg_mode: 6,
            ocr_engine_mode: 1,
            preserve_interword_spaces: true,
            noise_reduction: true,
        }
    }

    pub fn advanced() -> Self {
        Self {
            char_whitelist: format!("{}{}", DIGITS, UPPER),
            ..Self::standard()
        }
    }

    pub fn for_mode(mode: RecognitionMode) -> Self {
        match mode {
            RecognitionMode::Standard => Self::standard(),
            RecognitionMode::Advanced => Self::advanced(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub language: String,
    pub config: RecognitionConfig,
}

/// エンジンの生出力
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    /// 平均信頼度（0-100）
    pub confidence: f32,
}

/// 進捗通知（0.0-1.0）
pub type ProgressFn<'a> = &'a (dyn Fn(f32) + Send + Sync);

/// 外部の文字認識エンジン
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(
        &self,
        image: &DynamicImage,
        request: &OcrRequest,
        progress: ProgressFn<'_>,
    ) -> Result<OcrOutput>;
}

pub struct RecognitionInvoker<E: OcrEngine> {
    engine: E,
    language: String,
}

impl<E: OcrEngine> RecognitionInvoker<E> {
    pub fn new(engine: E, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// 認識を実行。進捗は開始前と終了後（成功・失敗とも）に 0 に戻す。
    pub async fn recognize(
        &self,
        image: &CapturedImage,
        rect: Option<SelectionRect>,
        mode: RecognitionMode,
        progress: &watch::Sender<f32>,
    ) -> Result<RecognizedText> {
        progress.send_replace(0.0);
        let result = self.run(image, rect, mode, progress).await;
        progress.send_replace(0.0);
        if let Err(e) = &result {
            warn!(error = %e, "recognition failed");
        }
        result
    }

    async fn run(
        &self,
        image: &CapturedImage,
        rect: Option<SelectionRect>,
        mode: RecognitionMode,
        progress: &watch::Sender<f32>,
    ) -> Result<RecognizedText> {
        let cropped = crop::crop_to_selection(image, rect)?;
        let request = OcrRequest {
            language: self.language.clone(),
            config: RecognitionConfig::for_mode(mode),
        };
        debug!(?rect, ?mode, width = cropped.width(), height = cropped.height(), "invoking engine");

        let report = |p: f32| {
            progress.send_replace(p.clamp(0.0, 1.0));
        };
        let output = self
            .engine
            .recognize(&cropped, &request, &report)
            .await
            .map_err(|e| match e {
                PartNumError::Recognition(_) => e,
                other => PartNumError::Recognition(other.to_string()),
            })?;

        debug!(chars = output.text.len(), confidence = output.confidence, "engine finished");
        Ok(recognized_lines(&output.text, Some(output.confidence)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_config() {
        let config = RecognitionConfig::standard();
        assert!(config.char_whitelist.starts_with("0123456789ABC"));
        assert!(config.char_whitelist.contains('z'));
        assert!(config.char_whitelist.contains('가'));
        assert!(config.char_whitelist.contains('힣'));
        assert_eq!(config.page_seg_mode, 6);
        assert!(config.preserve_interword_spaces);
        assert!(config.noise_reduction);
    }

    #[test]
    fn test_advanced_config_is_stricter() {
        let config = RecognitionConfig::for_mode(RecognitionMode::Advanced);
        assert_eq!(config.char_whitelist, "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert_eq!(config.page_seg_mode, 6);
    }
}
