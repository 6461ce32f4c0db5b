use crate::diagnostics::record::DiagnosticRecord;
use std::fmt;

/// Line-oriented view of a text buffer.
///
/// Lines are 0-based. Offsets are character offsets into the whole text.
pub trait Document {
    /// Always at least 1.
    fn line_count(&self) -> usize;

    fn line_start_offset(&self, line: usize) -> usize;

    /// End of `line`, excluding its terminator.
    fn line_end_offset(&self, line: usize) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`Document`] over a string slice.
#[derive(Debug, Clone)]
pub struct TextDocument<'a> {
    text: &'a str,
    /// Char offset where each line starts
    line_starts: Vec<usize>,
    /// Char offset where each line's content ends
    line_ends: Vec<usize>,
    /// Byte offset where each line starts
    byte_starts: Vec<usize>,
    char_len: usize,
}

impl<'a> TextDocument<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut line_ends = Vec::new();
        let mut byte_starts = vec![0];
        let mut char_idx = 0;
        let mut prev_cr = false;

        for (byte_idx, ch) in text.char_indices() {
            if ch == '\n' {
                line_ends.push(if prev_cr { char_idx - 1 } else { char_idx });
                line_starts.push(char_idx + 1);
                byte_starts.push(byte_idx + 1);
            }
            prev_cr = ch == '\r';
            char_idx += 1;
        }
        line_ends.push(if prev_cr { char_idx - 1 } else { char_idx });

        Self {
            text,
            line_starts,
            line_ends,
            byte_starts,
            char_len: char_idx,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte offset of a char offset. Offsets past the end map to the text length.
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        if char_offset >= self.char_len {
            return self.text.len();
        }
        let (line, column) = self.line_col(char_offset);
        let line_text = &self.text[self.byte_starts[line]..];
        self.byte_starts[line]
            + line_text
                .char_indices()
                .nth(column)
                .map_or(line_text.len(), |(idx, _)| idx)
    }

    /// 0-based `(line, column)` of a char offset.
    pub fn line_col(&self, char_offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&char_offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line, char_offset - self.line_starts[line])
    }

    /// Slice of the text between two char offsets.
    pub fn slice(&self, range: TextRange) -> &'a str {
        &self.text[self.byte_offset(range.start)..self.byte_offset(range.end)]
    }
}

impl Document for TextDocument<'_> {
    fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn line_start_offset(&self, line: usize) -> usize {
        self.line_starts[line]
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.line_ends[line]
    }

    fn len(&self) -> usize {
        self.char_len
    }
}

/// Half-open `[start, end)` range of char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Map a record's 1-based coordinates onto `doc`.
///
/// Coordinates may come from an older version of the file, so out-of-range
/// values are clamped to the nearest valid position instead of rejected.
/// Without a full end position the range covers one character, or nothing
/// at the end of a line.
pub fn map_range<D: Document + ?Sized>(doc: &D, record: &DiagnosticRecord) -> TextRange {
    let start_line = clamp_line(doc, record.line);
    let start = column_offset(doc, start_line, record.column);

    let end = match (record.end_line, record.end_column) {
        (Some(end_line), Some(end_column)) => {
            column_offset(doc, clamp_line(doc, end_line), end_column)
        }
        _ => (start + 1).min(doc.line_end_offset(start_line)),
    };

    TextRange::new(start, end.max(start))
}

fn clamp_line<D: Document + ?Sized>(doc: &D, line: u32) -> usize {
    let last = doc.line_count().saturating_sub(1);
    (line as usize).saturating_sub(1).min(last)
}

/// Column 0 means "start of line".
fn column_offset<D: Document + ?Sized>(doc: &D, line: usize, column: u32) -> usize {
    let line_start = doc.line_start_offset(line);
    if column == 0 {
        return line_start;
    }
    let line_end = doc.line_end_offset(line).max(line_start);
    line_start
        .saturating_add(column as usize - 1)
        .min(line_end)
}
