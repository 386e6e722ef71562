//! 認識結果のメモ（セッション内のみ、ファイルには書かない）
//!
//! 画像バイト列の SHA-256 と選択範囲・モードをキーにして、
//! 同じ認識の再実行でエンジンを呼ばないようにする。

use crate::recognizer::RecognitionMode;
use partnum_common::{CapturedImage, RecognizedText, SelectionRect};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    image_hash: String,
    rect: Option<SelectionRect>,
    mode: RecognitionMode,
}

impl CacheKey {
    pub fn new(image: &CapturedImage, rect: Option<SelectionRect>, mode: RecognitionMode) -> Self {
        Self {
            image_hash: compute_image_hash(image),
            rect: rect.filter(|r| !r.is_empty()),
            mode,
        }
    }
}

pub fn compute_image_hash(image: &CapturedImage) -> String {
    hex::encode(Sha256::digest(image.bytes()))
}

#[derive(Debug, Clone, Default)]
pub struct RecognitionCache {
    entries: HashMap<CacheKey, RecognizedText>,
}

impl RecognitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&RecognizedText> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: CacheKey, text: RecognizedText) {
        self.entries.insert(key, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
