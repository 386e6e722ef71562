//! セッションで扱うデータ型
//!
//! - CapturedImage: 撮影/ギャラリー選択された画像（エンコード済みバイト列）
//! - SelectionRect: 画像ピクセル座標の選択範囲
//! - RecognizedText: 1回の認識で得られた行の列
//! - PartRecord: 品番レコード

use serde::{Deserialize, Serialize};
use std::fmt;

/// 画像の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureSource {
    Camera,
    Gallery,
}

/// 取得済み画像
///
/// 再撮影時は丸ごと置き換える。中身は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    pub source: CaptureSource,
    /// 撮影日時（EXIF）
    pub taken_at: Option<String>,
}

impl CapturedImage {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32, source: CaptureSource) -> Self {
        Self {
            bytes,
            width,
            height,
            source,
            taken_at: None,
        }
    }

    pub fn with_taken_at(mut self, taken_at: Option<String>) -> Self {
        self.taken_at = taken_at;
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// 表示座標または画像座標の点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 選択範囲（画像ピクセル座標）
///
/// `x + width <= 画像幅`、`y + height <= 画像高さ` を満たすように
/// セレクタ側でクランプされる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SelectionRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 画像サイズに収まるよう切り詰める
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> Self {
        let x = self.x.min(image_width.saturating_sub(1));
        let y = self.y.min(image_height.saturating_sub(1));
        Self {
            x,
            y,
            width: self.width.min(image_width.saturating_sub(x)),
            height: self.height.min(image_height.saturating_sub(y)),
        }
    }
}

impl fmt::Display for SelectionRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// 1回の認識結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    pub lines: Vec<String>,
    /// エンジンが返した平均信頼度（0-100）
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl RecognizedText {
    pub fn new(lines: Vec<String>, confidence: Option<f32>) -> Self {
        Self { lines, confidence }
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }
}

/// レコード識別子（セッション内で単調増加、再利用しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 品番レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    pub id: RecordId,
    pub number: String,
    pub quantity: String,
    /// 単位名のコピー（カタログの改名は反映しない）
    pub unit: String,
    /// YYYYMMDD（空文字は未設定）
    #[serde(default)]
    pub expiry_date: String,
}
