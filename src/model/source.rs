//! The user-editable compilation input
//!
//! Cursor positions are byte offsets into the text and are always kept on
//! char boundaries.

use unicode_width::UnicodeWidthStr;

/// Source text owned by the input surface. Always defined, may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replace the whole text, discarding prior content
    pub fn overwrite(&mut self, text: &str) {
        self.0.clear();
        self.0.push_str(text);
    }

    /// Insert a character at `at`, returning the cursor after it
    pub fn insert_char(&mut self, at: usize, c: char) -> usize {
        let at = self.clamp(at);
        self.0.insert(at, c);
        at + c.len_utf8()
    }

    /// Remove the character before `at` (backspace), returning the new cursor
    pub fn delete_before(&mut self, at: usize) -> usize {
        let at = self.clamp(at);
        match self.0[..at].chars().next_back() {
            Some(c) => {
                let start = at - c.len_utf8();
                self.0.replace_range(start..at, "");
                start
            }
            None => at,
        }
    }

    /// Remove the character at `at` (delete key)
    pub fn delete_at(&mut self, at: usize) -> usize {
        let at = self.clamp(at);
        if let Some(c) = self.0[at..].chars().next() {
            self.0.replace_range(at..at + c.len_utf8(), "");
        }
        at
    }

    pub fn prev_boundary(&self, at: usize) -> usize {
        let at = self.clamp(at);
        self.0[..at]
            .chars()
            .next_back()
            .map_or(at, |c| at - c.len_utf8())
    }

    pub fn next_boundary(&self, at: usize) -> usize {
        let at = self.clamp(at);
        self.0[at..].chars().next().map_or(at, |c| at + c.len_utf8())
    }

    pub fn line_start(&self, at: usize) -> usize {
        let at = self.clamp(at);
        self.0[..at].rfind('\n').map_or(0, |i| i + 1)
    }

    pub fn line_end(&self, at: usize) -> usize {
        let at = self.clamp(at);
        self.0[at..].find('\n').map_or(self.0.len(), |i| at + i)
    }

    /// Move the cursor one line up or down, keeping the char column where the
    /// target line is long enough.
    pub fn move_vertical(&self, at: usize, up: bool) -> usize {
        let at = self.clamp(at);
        let start = self.line_start(at);
        let column = self.0[start..at].chars().count();

        let target_start = if up {
            if start == 0 {
                return 0;
            }
            self.line_start(start - 1)
        } else {
            let end = self.line_end(at);
            if end == self.0.len() {
                return self.0.len();
            }
            end + 1
        };

        let target_end = self.line_end(target_start);
        self.0[target_start..target_end]
            .char_indices()
            .nth(column)
            .map_or(target_end, |(i, _)| target_start + i)
    }

    /// Row and display column of `at`, for placing the terminal cursor
    pub fn cursor_position(&self, at: usize) -> (usize, usize) {
        let at = self.clamp(at);
        let row = self.0[..at].matches('\n').count();
        let start = self.line_start(at);
        (row, self.0[start..at].width())
    }

    /// Snap an arbitrary offset to the nearest preceding char boundary
    pub fn clamp(&self, at: usize) -> usize {
        let mut at = at.min(self.0.len());
        while !self.0.is_char_boundary(at) {
            at -= 1;
        }
        at
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_discards_prior_content() {
        let mut source = SourceText::new("func main() {}");
        source.overwrite("print 1");
        assert_eq!(source.as_str(), "print 1");

        source.overwrite("");
        assert!(source.is_empty());
    }

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut source = SourceText::default();
        let mut cursor = 0;
        for c in "aé€".chars() {
            cursor = source.insert_char(cursor, c);
        }
        assert_eq!(source.as_str(), "aé€");
        assert_eq!(cursor, source.len());

        cursor = source.delete_before(cursor);
        assert_eq!(source.as_str(), "aé");
        cursor = source.prev_boundary(cursor);
        assert_eq!(cursor, 1);
        source.delete_at(cursor);
        assert_eq!(source.as_str(), "a");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut source = SourceText::new("x");
        assert_eq!(source.delete_before(0), 0);
        assert_eq!(source.as_str(), "x");
    }

    #[test]
    fn test_move_vertical_keeps_column() {
        let source = SourceText::new("abcdef\nxy\nlonger line");
        // Cursor after "abcd"
        let down = source.move_vertical(4, false);
        // Line "xy" is shorter, so we land at its end
        assert_eq!(down, 9);
        let down = source.move_vertical(down, false);
        assert_eq!(&source.as_str()[down..], "nger line");
        let up = source.move_vertical(down, true);
        assert_eq!(up, 9);
        assert_eq!(source.move_vertical(2, true), 0);
    }

    #[test]
    fn test_cursor_position() {
        let source = SourceText::new("one\ntwo\nthree");
        assert_eq!(source.cursor_position(0), (0, 0));
        assert_eq!(source.cursor_position(6), (1, 2));
        assert_eq!(source.cursor_position(source.len()), (2, 5));
    }

    #[test]
    fn test_clamp_snaps_to_char_boundary() {
        let source = SourceText::new("é");
        assert_eq!(source.clamp(1), 0);
        assert_eq!(source.clamp(99), 2);
    }
}
