//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use partnum_rust::capture;
use partnum_rust::config::Config;
use partnum_rust::error::PartNumError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをギャラリーとして開いた場合
#[test]
fn test_gallery_nonexistent_folder() {
    let result = capture::scan_gallery(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(PartNumError::FolderNotFound(_))));
}

/// 空のフォルダ
#[test]
fn test_gallery_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = capture::scan_gallery(dir.path());

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.unwrap().is_empty());
}

/// 画像のないフォルダ
#[test]
fn test_gallery_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("memo.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = capture::scan_gallery(dir.path());
    assert!(result.unwrap().is_empty());
}

/// 範囲外のインデックス
#[test]
fn test_pick_from_gallery_out_of_range() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = capture::pick_from_gallery(dir.path(), 0);
    assert!(result.is_err());
}

/// 存在しない画像ファイル
#[test]
fn test_capture_missing_file() {
    let result = capture::capture_frame(Path::new("/nonexistent/label.jpg"));
    assert!(matches!(result, Err(PartNumError::FileNotFound(_))));
}

/// 画像として読めないファイル
#[test]
fn test_capture_broken_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"not an image").unwrap();

    let result = capture::capture_frame(&path);
    assert!(matches!(result, Err(PartNumError::ImageLoad(_))));
}

/// PartNumErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        PartNumError::Config("설정".to_string()),
        PartNumError::FileNotFound("label.jpg".to_string()),
        PartNumError::FolderNotFound("/path/to/folder".to_string()),
        PartNumError::Capture("카메라".to_string()),
        PartNumError::Recognition("엔진".to_string()),
        PartNumError::Busy,
        PartNumError::Validation("유통기한".to_string()),
        PartNumError::Export("내보내기".to_string()),
        PartNumError::Share("공유".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 変換（From）の確認
#[test]
fn test_error_conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "x");
    assert!(matches!(PartNumError::from(io), PartNumError::Io(_)));

    let json = serde_json::from_str::<Config>("{ broken").unwrap_err();
    assert!(matches!(PartNumError::from(json), PartNumError::JsonParse(_)));

    let common = partnum_common::Error::Config("x".into());
    let err = PartNumError::from(common);
    assert!(matches!(err, PartNumError::Common(_)));
    assert!(err.to_string().contains('x'));
}

/// 不正なJSON設定
#[test]
fn test_invalid_config_json() {
    let result: Result<Config, _> = serde_json::from_str(r#"{"min_confidence": "high"}"#);
    assert!(result.is_err());
}
