//! 共有（ネイティブ共有がなければクリップボードへコピー）

use crate::error::{PartNumError, Result};
use tracing::{debug, info};

/// プラットフォームの共有先
pub trait ShareTarget {
    fn is_available(&self) -> bool;
    fn share(&mut self, title: &str, text: &str) -> Result<()>;
}

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// システムクリップボード
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| PartNumError::Share(e.to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|e| PartNumError::Share(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    /// クリップボードにコピーした（確認メッセージ付き）
    CopiedToClipboard(String),
}

pub const CLIPBOARD_NOTICE: &str = "품번 목록이 클립보드에 복사되었습니다.";

pub fn share_text(
    native: Option<&mut dyn ShareTarget>,
    clipboard: &mut dyn ClipboardSink,
    title: &str,
    text: &str,
) -> Result<ShareOutcome> {
    if let Some(target) = native.filter(|t| t.is_available()) {
        debug!(title, "sharing via native target");
        target.share(title, text)?;
        return Ok(ShareOutcome::Shared);
    }
    clipboard.set_text(text)?;
    info!(chars = text.len(), "copied to clipboard");
    Ok(ShareOutcome::CopiedToClipboard(CLIPBOARD_NOTICE.to_string()))
}
