//! Shared text helpers.

/// Collapse whitespace and cut `text` to at most `max_chars` characters,
/// marking the cut with `…`.
///
/// ```
/// use council_domain::util::excerpt;
///
/// assert_eq!(excerpt("a  short\n line", 20), "a short line");
/// assert_eq!(excerpt("abcdefgh", 5), "abcd…");
/// ```
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut cut: String = collapsed.chars().take(max_chars - 1).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_no_op_when_short() {
        assert_eq!(excerpt("hi", 10), "hi");
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        // 3 bytes per character
        assert_eq!(excerpt("あのねあのね", 4), "あのね…");
    }

    #[test]
    fn excerpt_trims_before_marker() {
        assert_eq!(excerpt("one two three", 5), "one…");
    }

    #[test]
    fn excerpt_zero_width() {
        assert_eq!(excerpt("anything", 0), "");
        assert_eq!(excerpt("", 3), "");
    }
}
