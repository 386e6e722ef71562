//! 画像の取得（カメラ撮影ファイル / ギャラリー）

mod exif;

pub use self::exif::extract_date;

use crate::error::{PartNumError, Result};
use image::GenericImageView;
use partnum_common::{CaptureSource, CapturedImage};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub date: Option<String>,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// 画像ファイルを読み込み、サイズを確定する
pub fn load_image(path: &Path, source: CaptureSource) -> Result<CapturedImage> {
    if !path.is_file() {
        return Err(PartNumError::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)
        .map_err(|e| PartNumError::Capture(format!("{}: {}", path.display(), e)))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|e| PartNumError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(PartNumError::ImageLoad(format!("{}: 빈 이미지", path.display())));
    }
    debug!(path = %path.display(), width, height, "image loaded");

    Ok(CapturedImage::new(bytes, width, height, source).with_taken_at(extract_date(path).ok()))
}

/// カメラで撮影された画像
pub fn capture_frame(path: &Path) -> Result<CapturedImage> {
    load_image(path, CaptureSource::Camera)
}

/// ギャラリーフォルダ直下の画像一覧（ファイル名順）
pub fn scan_gallery(folder: &Path) -> Result<Vec<GalleryEntry>> {
    if !folder.is_dir() {
        return Err(PartNumError::FolderNotFound(folder.display().to_string()));
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_image = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        entries.push(GalleryEntry {
            path: path.to_path_buf(),
            file_name,
            date: extract_date(path).ok(),
        });
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(entries)
}

/// ギャラリーから1枚選ぶ
pub fn pick_from_gallery(folder: &Path, index: usize) -> Result<CapturedImage> {
    let entries = scan_gallery(folder)?;
    let entry = entries.get(index).ok_or_else(|| {
        PartNumError::Capture(format!(
            "갤러리에 {}번째 사진이 없습니다 ({}장)",
            index + 1,
            entries.len()
        ))
    })?;
    load_image(&entry.path, CaptureSource::Gallery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs::File;
    use std::io::Write;

    fn write_png(path: &Path, w: u32, h: u32) {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(w, h, Rgb([255, 255, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("PNG"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("gif"));
    }

    #[test]
    fn test_scan_gallery_not_found() {
        let result = scan_gallery(Path::new("/nonexistent/gallery"));
        assert!(matches!(result, Err(PartNumError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_gallery_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("c.jpg")).unwrap().write_all(b"x").unwrap();
        File::create(dir.path().join("a.png")).unwrap().write_all(b"x").unwrap();
        File::create(dir.path().join("b.JPG")).unwrap().write_all(b"x").unwrap();
        File::create(dir.path().join("notes.txt")).unwrap().write_all(b"x").unwrap();

        let entries = scan_gallery(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "c.jpg"]);
    }

    #[test]
    fn test_capture_frame_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        write_png(&path, 64, 32);

        let image = capture_frame(&path).unwrap();
        assert_eq!((image.width(), image.height()), (64, 32));
        assert_eq!(image.source, CaptureSource::Camera);
        assert!(image.taken_at.is_none());
    }

    #[test]
    fn test_capture_frame_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(capture_frame(&path), Err(PartNumError::ImageLoad(_))));
    }

    #[test]
    fn test_pick_from_gallery() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("1.png"), 10, 10);
        write_png(&dir.path().join("2.png"), 20, 10);

        let image = pick_from_gallery(dir.path(), 1).unwrap();
        assert_eq!(image.width(), 20);
        assert_eq!(image.source, CaptureSource::Gallery);
        assert!(matches!(pick_from_gallery(dir.path(), 5), Err(PartNumError::Capture(_))));
    }
}
