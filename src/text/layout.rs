//! Line wrapping by display width.
//!
//! Han-script characters occupy two width units, everything else one. A line
//! is broken as soon as the running width exceeds the budget, and the
//! character that overflowed starts the next line.

/// Inclusive code point ranges of the Han script.
const HAN_RANGES: &[(u32, u32)] = &[
    (0x2E80, 0x2E99),
    (0x2E9B, 0x2EF3),
    (0x2F00, 0x2FD5),
    (0x3005, 0x3005),
    (0x3007, 0x3007),
    (0x3021, 0x3029),
    (0x3038, 0x303B),
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0xF900, 0xFA6D),
    (0xFA70, 0xFAD9),
    (0x16FE2, 0x16FE3),
    (0x16FF0, 0x16FF1),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B739),
    (0x2B740, 0x2B81D),
    (0x2B820, 0x2CEA1),
    (0x2CEB0, 0x2EBE0),
    (0x2F800, 0x2FA1D),
    (0x30000, 0x3134A),
    (0x31350, 0x323AF),
];

/// Whether `ch` belongs to the Han script.
pub fn is_han(ch: char) -> bool {
    let cp = ch as u32;
    HAN_RANGES
        .binary_search_by(|&(start, end)| {
            if cp < start {
                std::cmp::Ordering::Greater
            } else if cp > end {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        })
        .is_ok()
}

/// Display width of a single character in budget units.
#[inline]
pub fn char_width(ch: char) -> usize {
    if is_han(ch) { 2 } else { 1 }
}

/// Wrapped lines produced by [`wrap`].
#[derive(Debug)]
pub struct Lines {
    inner: std::vec::IntoIter<String>,
}

impl Iterator for Lines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Lines {}

/// Wrap `content` into lines of at most `line_budget` width units.
///
/// The counter resets to zero (not to the overflowing character's width) when
/// a line breaks. The line index is tracked separately from the number of
/// lines produced: if the very first character already overflows, it still
/// lands on the first line and the next character opens a second one.
///
/// ## Example
///
/// ```
/// use poster::text::wrap;
///
/// let lines: Vec<String> = wrap("你好ab", 4).collect();
/// assert_eq!(lines, vec!["你好", "ab"]);
/// ```
pub fn wrap(content: &str, line_budget: usize) -> Lines {
    let mut lines: Vec<String> = Vec::new();
    let mut line = 0usize;
    let mut count = 0usize;

    for ch in content.chars() {
        count += char_width(ch);
        if count > line_budget {
            line += 1;
            count = 0;
        }
        if lines.len() <= line {
            lines.push(ch.to_string());
        } else {
            lines[line].push(ch);
        }
    }

    Lines {
        inner: lines.into_iter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrapped(content: &str, budget: usize) -> Vec<String> {
        wrap(content, budget).collect()
    }

    #[test]
    fn test_mixed_width_break() {
        assert_eq!(wrapped("你好ab", 4), vec!["你好", "ab"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(wrapped("", 1).is_empty());
        assert!(wrapped("", 20).is_empty());
        assert_eq!(wrap("", 5).len(), 0);
    }

    #[test]
    fn test_counter_resets_to_zero() {
        // 'c' overflows (3 > 2) and the counter restarts at zero, so the
        // following two characters still fit on the new line.
        assert_eq!(wrapped("abcde", 2), vec!["ab", "cde"]);
    }

    #[test]
    fn test_default_budget_of_one() {
        assert_eq!(wrapped("abcd", 1), vec!["a", "bc", "d"]);
    }

    #[test]
    fn test_first_character_overflow() {
        // A Han character alone exceeds a budget of one. It still opens the
        // first line and the next character opens another.
        assert_eq!(wrapped("你ab", 1), vec!["你", "a", "b"]);
    }

    #[test]
    fn test_fits_on_one_line() {
        assert_eq!(wrapped("爱 就 大 声 说 出 来", 20), vec!["爱 就 大 声 说 出 来"]);
    }

    #[test]
    fn test_han_detection() {
        assert!(is_han('爱'));
        assert!(is_han('〇'));
        assert!(is_han('\u{20000}'));
        assert!(!is_han('a'));
        assert!(!is_han('，'));
        assert!(!is_han('あ'));
        assert!(!is_han('한'));
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('好'), 2);
        assert_eq!(char_width('b'), 1);
        assert_eq!(char_width(' '), 1);
    }
}
