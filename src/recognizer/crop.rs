//! 選択範囲での切り出し

use crate::error::{PartNumError, Result};
use image::{DynamicImage, GenericImageView};
use partnum_common::{CapturedImage, SelectionRect};

pub fn decode(image: &CapturedImage) -> Result<DynamicImage> {
    image::load_from_memory(image.bytes()).map_err(|e| PartNumError::ImageLoad(e.to_string()))
}

/// 選択範囲の大きさの新しい画像に、範囲の原点から写し取る
///
/// 範囲なし・面積0の範囲は画像全体を返す。
pub fn crop_to_selection(image: &CapturedImage, rect: Option<SelectionRect>) -> Result<DynamicImage> {
    let decoded = decode(image)?;
    let (width, height) = decoded.dimensions();
    match rect.map(|r| r.clamp_to(width, height)) {
        Some(r) if !r.is_empty() => Ok(decoded.crop_imm(r.x, r.y, r.width, r.height)),
        _ => Ok(decoded),
    }
}
