//! 品番候補の抽出と入力値の検証

use chrono::NaiveDate;
use regex::Regex;

/// 品番とみなす桁数
pub const PART_NUMBER_DIGITS: std::ops::RangeInclusive<usize> = 6..=12;

lazy_static::lazy_static! {
    static ref DIGIT_RUN_RE: Regex = Regex::new(r"[0-9]+").unwrap();
    static ref PART_NUMBER_RE: Regex = Regex::new(r"^[0-9]{6,12}$").unwrap();
    static ref EXPIRY_RE: Regex = Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})$").unwrap();
}

/// テキスト中の 6〜12 桁の数字列（出現順）
pub fn extract_part_numbers(text: &str) -> Vec<String> {
    DIGIT_RUN_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| PART_NUMBER_DIGITS.contains(&s.len()))
        .map(str::to_string)
        .collect()
}

pub fn is_valid_part_number(text: &str) -> bool {
    PART_NUMBER_RE.is_match(text.trim())
}

/// YYYYMMDD 形式の実在する日付か
pub fn is_valid_expiry_date(text: &str) -> bool {
    let Some(cap) = EXPIRY_RE.captures(text.trim()) else {
        return false;
    };
    let (Ok(y), Ok(m), Ok(d)) = (cap[1].parse::<i32>(), cap[2].parse::<u32>(), cap[3].parse::<u32>()) else {
        return false;
    };
    NaiveDate::from_ymd_opt(y, m, d).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_part_numbers() {
        let text = "LOT 12345 P/N 123456\nCODE 1234567890123 EXP 20241231";
        assert_eq!(extract_part_numbers(text), vec!["123456", "20241231"]);
    }

    #[test]
    fn test_extract_part_numbers_none() {
        assert!(extract_part_numbers("AB12 34 56").is_empty());
        assert!(extract_part_numbers("").is_empty());
    }

    #[test]
    fn test_is_valid_part_number() {
        assert!(is_valid_part_number("123456"));
        assert!(is_valid_part_number(" 123456789012 "));
        assert!(!is_valid_part_number("12345"));
        assert!(!is_valid_part_number("1234567890123"));
        assert!(!is_valid_part_number("12345A"));
    }

    #[test]
    fn test_is_valid_expiry_date() {
        assert!(is_valid_expiry_date("20241231"));
        assert!(is_valid_expiry_date("20240229"));
        assert!(!is_valid_expiry_date("20230229"));
        assert!(!is_valid_expiry_date("20241301"));
        assert!(!is_valid_expiry_date("2024123"));
        assert!(!is_valid_expiry_date("2024-12-31"));
    }
}
