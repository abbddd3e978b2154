//! Text splitting at natural boundaries.

/// Splits `text` so that the first part is shorter than `max_len` characters.
///
/// Text shorter than `max_len` is returned whole. Otherwise the cut happens,
/// in order of preference, at the last paragraph break (`\n\n`), the last line
/// break, or the last space found inside the first `max_len` characters. When
/// none exists the text is cut one character before the limit.
///
/// The separator is dropped, the first part is trimmed at its end and the
/// remainder at both ends. An empty remainder is returned as `None`.
///
/// # Arguments
///
/// * `text` - The text to split
/// * `max_len` - The length limit in characters, at least 2
///
/// # Examples
///
/// ```no_run
/// use herald::pagination::split_text;
///
/// let (former, latter) = split_text("first paragraph\n\nsecond", 20);
/// assert_eq!(former, "first paragraph");
/// assert_eq!(latter, Some("second"));
/// ```
pub fn split_text(text: &str, max_len: usize) -> (&str, Option<&str>) {
    if text.chars().count() < max_len {
        return (text, None);
    }
    let window = &text[..char_offset(text, max_len).unwrap_or(text.len())];

    let cut = ["\n\n", "\n", " "]
        .iter()
        .find_map(|separator| window.rfind(separator).filter(|&index| index > 0))
        .or_else(|| char_offset(text, max_len.saturating_sub(1).max(1)))
        .unwrap_or(text.len());

    let former = text[..cut].trim_end();
    let latter = text[cut..].trim();

    if latter.is_empty() {
        (former, None)
    } else {
        (former, Some(latter))
    }
}

/// Byte offset of the `n`-th character of `text`.
fn char_offset(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_not_split() {
        assert_eq!(split_text("hello", 10), ("hello", None));
    }

    #[test]
    fn test_text_at_the_limit_is_split() {
        let (former, latter) = split_text("abcd efghi", 10);
        assert_eq!(former, "abcd");
        assert_eq!(latter, Some("efghi"));
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = "one two\nthree\n\nfour five six seven";
        let (former, latter) = split_text(text, 20);
        assert_eq!(former, "one two\nthree");
        assert_eq!(latter, Some("four five six seven"));
    }

    #[test]
    fn test_falls_back_to_line_break() {
        let text = "one two\nthree four five six";
        let (former, latter) = split_text(text, 15);
        assert_eq!(former, "one two");
        assert_eq!(latter, Some("three four five six"));
    }

    #[test]
    fn test_falls_back_to_space() {
        let text = "one two three four five";
        let (former, latter) = split_text(text, 12);
        assert_eq!(former, "one two");
        assert_eq!(latter, Some("three four five"));
    }

    #[test]
    fn test_hard_cut_one_before_limit() {
        let text = "abcdefghijklmnop";
        let (former, latter) = split_text(text, 10);
        assert_eq!(former, "abcdefghi");
        assert_eq!(latter, Some("jklmnop"));
    }

    #[test]
    fn test_separator_beyond_limit_is_ignored() {
        let text = "abcdefghijkl mnop";
        let (former, latter) = split_text(text, 10);
        assert_eq!(former, "abcdefghi");
        assert_eq!(latter, Some("jkl mnop"));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "ééééé ééééé";
        let (former, latter) = split_text(text, 8);
        assert_eq!(former, "ééééé");
        assert_eq!(latter, Some("ééééé"));
    }

    #[test]
    fn test_whitespace_only_remainder_is_none() {
        let (former, latter) = split_text("abcdefghi    ", 10);
        assert_eq!(former, "abcdefghi");
        assert_eq!(latter, None);
    }

    #[test]
    fn test_every_split_shortens_the_remainder() {
        let mut rest = "x".repeat(95);
        let mut parts = 0;
        loop {
            let (former, latter) = split_text(&rest, 10);
            assert!(former.chars().count() < 10);
            parts += 1;
            match latter {
                Some(latter) => {
                    assert!(latter.len() < rest.len());
                    rest = latter.to_owned();
                }
                None => break,
            }
        }
        assert_eq!(parts, 11);
    }
}
