use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Terminal columns `s` occupies (CJK and emoji count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: char = '…';

/// Cut `s` so it fits in `max_width` columns, ending with `…` when shortened.
///
/// Returns the input unchanged (borrowed) when it already fits.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    let mut out = String::with_capacity(end + ELLIPSIS.len_utf8());
    out.push_str(&s[..end]);
    out.push(ELLIPSIS);
    Cow::Owned(out)
}

/// Truncate, then pad with spaces to exactly `width` columns.
pub fn fit_to_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let pad = width.saturating_sub(display_width(&cut));
    let mut out = cut.into_owned();
    out.extend(std::iter::repeat(' ').take(pad));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_counts_wide_chars() {
        assert_eq!(display_width("Nami"), 4);
        assert_eq!(display_width("视频"), 4);
    }

    #[test]
    fn test_fits_is_borrowed() {
        assert!(matches!(truncate_to_width("Viral", 5), Cow::Borrowed("Viral")));
    }

    #[test]
    fn test_truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("Camera Controls", 7), "Camera…");
        assert_eq!(truncate_to_width("Camera", 0), "");
        assert_eq!(truncate_to_width("Camera", 1), "…");
    }

    #[test]
    fn test_wide_char_not_split() {
        // budget 2 after the ellipsis; "视" takes 2, "频" would overflow
        assert_eq!(truncate_to_width("视频片段", 3), "视…");
    }

    #[test]
    fn test_fit_pads() {
        assert_eq!(fit_to_width("UGC", 6), "UGC   ");
        assert_eq!(display_width(&fit_to_width("Black Friday", 6)), 6);
    }
}
