//! Fenced code block tracking shared by rendering and validation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    marker: u8,
    len: usize,
    line: usize,
}

/// Line-by-line CommonMark fence state (```` ``` ```` and `~~~`, indent up to three spaces).
#[derive(Debug, Clone, Default)]
pub(crate) struct FenceTracker {
    open: Option<OpenFence>,
}

fn fence_run(line: &str) -> Option<(u8, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = *rest.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let len = rest.bytes().take_while(|b| *b == marker).count();
    if len < 3 {
        return None;
    }
    Some((marker, len, &rest[len..]))
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns `true` when the line belongs to a fenced block,
    /// delimiters included.
    pub(crate) fn observe(&mut self, line_no: usize, line: &str) -> bool {
        let line = line.trim_end_matches(['\r', '\n']);
        match self.open {
            Some(open) => {
                let closes = fence_run(line).is_some_and(|(marker, len, tail)| {
                    marker == open.marker && len >= open.len && tail.trim().is_empty()
                });
                if closes {
                    self.open = None;
                }
                true
            }
            None => {
                let Some((marker, len, info)) = fence_run(line) else {
                    return false;
                };
                if marker == b'`' && info.contains('`') {
                    return false;
                }
                self.open = Some(OpenFence {
                    marker,
                    len,
                    line: line_no,
                });
                true
            }
        }
    }

    /// Line number of the fence still open after the last observed line.
    pub(crate) fn unclosed_line(&self) -> Option<usize> {
        self.open.map(|open| open.line)
    }
}

#[cfg(test)]
mod tests {
    use super::FenceTracker;

    fn inside_flags(text: &str) -> (Vec<bool>, Option<usize>) {
        let mut tracker = FenceTracker::new();
        let flags = text
            .lines()
            .enumerate()
            .map(|(idx, line)| tracker.observe(idx + 1, line))
            .collect();
        (flags, tracker.unclosed_line())
    }

    #[test]
    fn test_backtick_and_tilde_fences() {
        let (flags, open) = inside_flags("a\n```rust\n[[x]]\n```\nb\n~~~\nc\n~~~~\nd");
        assert_eq!(
            flags,
            vec![false, true, true, true, false, true, true, true, false]
        );
        assert_eq!(open, None);
    }

    #[test]
    fn test_closing_fence_must_match_marker_and_length() {
        let (flags, open) = inside_flags("````\n```\n~~~~\n````\nafter");
        assert_eq!(flags, vec![true, true, true, true, false]);
        assert_eq!(open, None);
    }

    #[test]
    fn test_unclosed_fence_reports_opening_line() {
        let (_, open) = inside_flags("text\n\n   ~~~\ncode");
        assert_eq!(open, Some(3));
    }

    #[test]
    fn test_non_fences() {
        let (flags, open) = inside_flags("``inline``\n    ```\n``` a`b");
        assert_eq!(flags, vec![false, false, false]);
        assert_eq!(open, None);
    }
}
