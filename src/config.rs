use crate::error::{PartNumError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const TESSERACT_ENV: &str = "PARTNUM_TESSERACT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// tesseract 実行ファイル
    pub tesseract_cmd: String,
    /// 認識言語（tesseract の -l）
    pub language: String,
    /// 単位カタログの初期値
    pub default_units: Vec<String>,
    /// これ未満の平均信頼度は警告
    pub min_confidence: f32,
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tesseract_cmd: "tesseract".into(),
            language: "kor+eng".into(),
            default_units: ["카톤", "중포", "개", "박스", "kg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_confidence: 30.0,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PartNumError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("partnum").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        if self.default_units.iter().all(|u| u.trim().is_empty()) {
            return Err(PartNumError::Config("default_units 에 단위가 하나 이상 필요합니다".into()));
        }
        if self.language.trim().is_empty() {
            return Err(PartNumError::Config("language 가 비어 있습니다".into()));
        }
        Ok(())
    }

    /// 環境変数を優先
    pub fn tesseract_cmd(&self) -> String {
        std::env::var(TESSERACT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.tesseract_cmd.clone())
    }

    pub fn set_tesseract_cmd(&mut self, cmd: String) -> Result<()> {
        self.tesseract_cmd = cmd;
        self.save()
    }

    pub fn set_language(&mut self, language: String) -> Result<()> {
        self.language = language;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, "kor+eng");
        assert_eq!(config.default_units[0], "카톤");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"language": "eng"}"#).unwrap();
        assert_eq!(config.language, "eng");
        assert_eq!(config.tesseract_cmd, "tesseract");
        assert_eq!(config.default_units.len(), 5);
    }

    #[test]
    fn test_validate_rejects_empty_units() {
        let config = Config {
            default_units: vec!["  ".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PartNumError::Config(_))));
    }
}
