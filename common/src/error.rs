//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    /// シェル資産の取得失敗
    #[error("Fetch error: {0}")]
    Fetch(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let error = Error::Config("단위 목록이 비어 있습니다".to_string());
        assert_eq!(format!("{}", error), "Config error: 단위 목록이 비어 있습니다");
    }

    #[test]
    fn test_error_display_fetch() {
        let error = Error::Fetch("/partnumbermanager/: status 404".to_string());
        assert_eq!(
            format!("{}", error),
            "Fetch error: /partnumbermanager/: status 404"
        );
    }
}
