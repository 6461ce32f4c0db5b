//! Byte-span replacement with before-text verification.
//!
//! Every write this crate performs goes through [`Edit`]: config patches are
//! a single span replacement over `.splint.edn`, quick fixes are a batch of
//! span replacements over a source file. The full new content is computed
//! in memory and then written atomically, so a failed edit never leaves a
//! half-written file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Spans larger than this are verified by hash instead of by copy.
const HASH_THRESHOLD: usize = 1024;

/// Replace `[byte_start, byte_end)` of `file` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    pub file: PathBuf,
    /// Inclusive
    pub byte_start: usize,
    /// Exclusive
    pub byte_end: usize,
    pub new_text: String,
    /// What the span must currently contain for the edit to apply
    pub expected_before: EditVerification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected) => xxh3_64(text.as_bytes()) == *expected,
        }
    }

    /// Exact match for short spans, hash above 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > HASH_THRESHOLD {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{file} changed since it was read: expected text not found at byte {byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("byte offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("overlapping edits in {file} at bytes {first_start} and {second_start}")]
    Overlapping {
        file: PathBuf,
        first_start: usize,
        second_start: usize,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult tells whether the file was touched"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already held `new_text`
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        let expected = expected_before.into();
        Self::with_verification(
            file,
            byte_start,
            byte_end,
            new_text,
            EditVerification::from_text(&expected),
        )
    }

    pub fn with_verification(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        verification: EditVerification,
    ) -> Self {
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: verification,
        }
    }

    /// Check the edit against `content`.
    ///
    /// Returns `true` when the span already holds `new_text`.
    fn verify(&self, content: &str) -> Result<bool, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }
        for offset in [self.byte_start, self.byte_end] {
            if !content.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &content[self.byte_start..self.byte_end];
        if current == self.new_text {
            return Ok(true);
        }
        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                found: current.to_string(),
            });
        }
        Ok(false)
    }

    /// Apply to an in-memory copy of the file's content.
    pub fn apply_to(&self, content: &str) -> Result<String, EditError> {
        if self.verify(content)? {
            return Ok(content.to_string());
        }
        let mut out = String::with_capacity(
            content.len() + self.new_text.len() - (self.byte_end - self.byte_start),
        );
        out.push_str(&content[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&content[self.byte_end..]);
        Ok(out)
    }

    /// Read the file, apply, and write the result atomically.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let bytes = fs::read(&self.file)?;
        let content = std::str::from_utf8(&bytes)?;

        if self.verify(content)? {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }

        let updated = self.apply_to(content)?;
        write_atomic(&self.file, updated.as_bytes())?;
        touch(&self.file)?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_text.len(),
        })
    }

    /// Apply many edits, one atomic write per file.
    ///
    /// Within a file, edits are applied from the highest offset down so
    /// earlier offsets stay valid. Overlapping spans are rejected before
    /// anything is written.
    pub fn apply_batch(edits: Vec<Edit>) -> Result<Vec<EditResult>, EditError> {
        let mut by_file: BTreeMap<PathBuf, Vec<Edit>> = BTreeMap::new();
        for edit in edits {
            by_file.entry(edit.file.clone()).or_default().push(edit);
        }

        let mut results = Vec::new();
        for (file, mut file_edits) in by_file {
            file_edits.sort_by(|a, b| (b.byte_start, b.byte_end).cmp(&(a.byte_start, a.byte_end)));
            results.extend(apply_file_edits(&file, &file_edits)?);
        }
        Ok(results)
    }
}

/// Edits must be sorted by `(byte_start, byte_end)`, descending.
///
/// An insertion at the start of a replaced span lands before the
/// replacement. Two insertions at the same offset are ambiguous and rejected.
fn apply_file_edits(file: &Path, edits: &[Edit]) -> Result<Vec<EditResult>, EditError> {
    let bytes = fs::read(file)?;
    let original = std::str::from_utf8(&bytes)?;

    for pair in edits.windows(2) {
        let (later, earlier) = (&pair[0], &pair[1]);
        let same_point = earlier.byte_start == later.byte_start && earlier.byte_end == later.byte_end;
        if earlier.byte_end > later.byte_start || same_point {
            return Err(EditError::Overlapping {
                file: file.to_path_buf(),
                first_start: earlier.byte_start,
                second_start: later.byte_start,
            });
        }
    }

    let mut pending = Vec::with_capacity(edits.len());
    for edit in edits {
        pending.push(!edit.verify(original)?);
    }

    let mut content = original.to_string();
    let mut results = Vec::with_capacity(edits.len());
    for (edit, needs_apply) in edits.iter().zip(pending) {
        if needs_apply {
            content.replace_range(edit.byte_start..edit.byte_end, &edit.new_text);
            results.push(EditResult::Applied {
                file: file.to_path_buf(),
                bytes_changed: edit.new_text.len(),
            });
        } else {
            results.push(EditResult::AlreadyApplied {
                file: file.to_path_buf(),
            });
        }
    }

    if content != original {
        write_atomic(file, content.as_bytes())?;
        touch(file)?;
    }

    Ok(results)
}

/// Write `content` to `path` via a temp file in the same directory, fsync,
/// then rename over the target.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Bump mtime so file watchers (and the linter's own cache) see the change.
fn touch(path: &Path) -> Result<(), EditError> {
    filetime::set_file_mtime(path, filetime::FileTime::now())?;
    Ok(())
}
