//! Script classification used to decide which words get character wipes.

use crate::config::AnimationConfig;

fn is_rtl_char(c: char) -> bool {
    matches!(c as u32,
        0x0590..=0x05FF   // Hebrew
        | 0x0600..=0x06FF // Arabic
        | 0x0700..=0x074F // Syriac
        | 0x0750..=0x077F // Arabic supplement
        | 0x0780..=0x07BF // Thaana
        | 0x07C0..=0x07FF // NKo
        | 0x08A0..=0x08FF // Arabic extended-A
        | 0xFB1D..=0xFDFF // Hebrew/Arabic presentation forms-A
        | 0xFE70..=0xFEFF // Arabic presentation forms-B
    )
}

fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x11FF   // Hangul jamo
        | 0x2E80..=0x2FDF // CJK radicals
        | 0x3000..=0x303F // CJK symbols and punctuation
        | 0x3040..=0x309F // Hiragana
        | 0x30A0..=0x30FF // Katakana
        | 0x3100..=0x312F // Bopomofo
        | 0x3130..=0x318F // Hangul compatibility jamo
        | 0x3400..=0x4DBF // CJK extension A
        | 0x4E00..=0x9FFF // CJK unified ideographs
        | 0xAC00..=0xD7AF // Hangul syllables
        | 0xF900..=0xFAFF // CJK compatibility ideographs
        | 0xFF00..=0xFFEF // Half/full-width forms
        | 0x20000..=0x2FA1F
    )
}

/// True if any character belongs to a right-to-left script
pub fn is_rtl(text: &str) -> bool {
    text.chars().any(is_rtl_char)
}

/// True if any character is CJK
pub fn is_cjk(text: &str) -> bool {
    text.chars().any(is_cjk_char)
}

/// Whether a word is short and slow enough to get per-character wipes
pub fn is_growable(word: &str, word_duration_ms: i64, config: &AnimationConfig) -> bool {
    let visible = word.chars().filter(|c| !c.is_whitespace()).count();
    visible > 0
        && visible <= config.growable_max_chars
        && word_duration_ms >= config.growable_min_duration_ms
        && !is_rtl(word)
        && !is_cjk(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtl_detection() {
        assert!(is_rtl("שלום"));
        assert!(is_rtl("مرحبا"));
        assert!(!is_rtl("hello"));
    }

    #[test]
    fn test_cjk_detection() {
        assert!(is_cjk("愛"));
        assert!(is_cjk("さくら"));
        assert!(is_cjk("사랑"));
        assert!(!is_cjk("love"));
    }

    #[test]
    fn test_growable_rules() {
        let config = AnimationConfig::default();
        assert!(is_growable("oh ", 800, &config));
        assert!(!is_growable("oh ", 799, &config));
        assert!(!is_growable("forevermore", 2000, &config));
        assert!(!is_growable("愛", 2000, &config));
        assert!(!is_growable("שלום", 2000, &config));
        assert!(!is_growable("  ", 2000, &config));
    }
}
