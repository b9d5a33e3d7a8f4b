use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// `MM:SS`, minutes zero-padded and allowed past 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Studied time as `Hh MMm`.
pub fn format_studied(secs: u64) -> String {
    format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
}

/// Cut `text` to at most `width` terminal columns, marking the cut with '…'.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(3000), "50:00");
        assert_eq!(format_clock(7200), "120:00");
    }

    #[test]
    fn test_format_studied() {
        assert_eq!(format_studied(0), "0h 00m");
        assert_eq!(format_studied(5400), "1h 30m");
        assert_eq!(format_studied(36_000 + 59), "10h 00m");
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_to_width("read", 10), "read");
        assert_eq!(truncate_to_width("read", 4), "read");
    }

    #[test]
    fn test_truncate_marks_cut() {
        assert_eq!(truncate_to_width("read chapter", 6), "read …");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK char takes two columns.
        assert_eq!(truncate_to_width("漢字漢字", 5), "漢字…");
    }
}
