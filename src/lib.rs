//! partnum: 라벨 사진에서 품번을 읽어 목록으로 정리하는 도구
//!
//! 撮影 → 範囲選択 → 文字認識 → 行の取り込み → レコード一覧 → 出力/共有

pub mod cache;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod interactive;
pub mod part_number;
pub mod pipeline;
pub mod recognizer;
pub mod share;
