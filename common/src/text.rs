//! 認識テキストの後処理
//!
//! エンジンの生テキストから英数字・ハングル・空白以外を除き、
//! 連続する空白を1つにまとめる。行の区切りは保持する。

use crate::types::RecognizedText;

fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7A3}'   // 完成形音節
        | '\u{1100}'..='\u{11FF}' // 字母
        | '\u{3130}'..='\u{318F}' // 互換字母
    )
}

fn is_kept(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_hangul(c) || c.is_whitespace()
}

/// 1行分を整形
///
/// # Examples
/// ```
/// use partnum_common::clean_line;
///
/// assert_eq!(clean_line("AB12#34  56"), "AB1234 56");
/// ```
pub fn clean_line(line: &str) -> String {
    line.chars()
        .filter(|&c| is_kept(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// テキスト全体を整形（空行は除去）
pub fn clean_text(raw: &str) -> String {
    raw.lines()
        .map(clean_line)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// エンジン出力を行の列に変換
pub fn recognized_lines(raw: &str, confidence: Option<f32>) -> RecognizedText {
    let lines = clean_text(raw)
        .lines()
        .map(str::to_string)
        .collect();
    RecognizedText::new(lines, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_scenario() {
        assert_eq!(clean_line("AB12#34  56"), "AB1234 56");
    }

    #[test]
    fn test_clean_line_keeps_hangul() {
        assert_eq!(clean_line("  품번: 123-456 (카톤) "), "품번 123456 카톤");
    }

    #[test]
    fn test_clean_line_drops_other_symbols() {
        assert_eq!(clean_line("№ 12/34 ※ é"), "1234");
    }

    #[test]
    fn test_clean_text_keeps_lines() {
        let raw = "LOT 1234\n\n  #### \nEXP\t20241231\r\n";
        assert_eq!(clean_text(raw), "LOT 1234\nEXP 20241231");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let samples = [
            "AB12#34  56",
            "  가나다\t\tABC !! 123\n\n x ",
            "\u{3131}\u{314F} mixed   — dashes –",
            "",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "{:?}", s);
        }
    }

    #[test]
    fn test_recognized_lines() {
        let text = recognized_lines("123456 EA\n@@\nBOX 2", Some(88.0));
        assert_eq!(text.lines, vec!["123456 EA", "BOX 2"]);
        assert_eq!(text.confidence, Some(88.0));
    }
}
