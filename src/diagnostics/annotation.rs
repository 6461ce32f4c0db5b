use crate::diagnostics::range::{map_range, Document, TextDocument, TextRange};
use crate::diagnostics::record::{DiagnosticRecord, Severity};
use crate::edit::Edit;
use std::path::PathBuf;

/// Longest replacement shown verbatim in a fix label.
const LABEL_MAX_CHARS: usize = 40;
const LABEL_KEEP_CHARS: usize = 37;

/// A diagnostic placed on a document, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub severity: Severity,
    pub message: String,
    pub range: TextRange,
    pub fix: Option<QuickFix>,
}

impl Annotation {
    pub fn from_record<D: Document + ?Sized>(doc: &D, record: &DiagnosticRecord) -> Self {
        let range = map_range(doc, record);
        let fix = record
            .alt
            .as_deref()
            .filter(|alt| !alt.trim().is_empty())
            .map(|alt| QuickFix::new(range, alt));

        Self {
            severity: record.severity(),
            message: record.rendered_message(),
            range,
            fix,
        }
    }
}

/// One annotation per record, in record order.
pub fn annotate<D: Document + ?Sized>(doc: &D, records: &[DiagnosticRecord]) -> Vec<Annotation> {
    records
        .iter()
        .map(|record| Annotation::from_record(doc, record))
        .collect()
}

/// Replace the flagged range with splint's suggested form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickFix {
    pub range: TextRange,
    pub replacement: String,
}

impl QuickFix {
    pub const FAMILY_NAME: &'static str = "Splint fixes";

    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn family_name(&self) -> &'static str {
        Self::FAMILY_NAME
    }

    pub fn label(&self) -> String {
        if self.replacement.chars().count() > LABEL_MAX_CHARS {
            let head: String = self.replacement.chars().take(LABEL_KEEP_CHARS).collect();
            format!("Replace with: {head}...")
        } else {
            format!("Replace with: {}", self.replacement)
        }
    }

    /// The range must still fit a document of `document_len` chars.
    pub fn is_available(&self, document_len: usize) -> bool {
        self.range.end <= document_len
    }

    /// `text` with the range replaced, or `None` if the range no longer fits.
    pub fn apply(&self, text: &str) -> Option<String> {
        let doc = TextDocument::new(text);
        if !self.is_available(doc.len()) {
            return None;
        }
        let start = doc.byte_offset(self.range.start);
        let end = doc.byte_offset(self.range.end);

        let mut out = String::with_capacity(text.len() + self.replacement.len());
        out.push_str(&text[..start]);
        out.push_str(&self.replacement);
        out.push_str(&text[end..]);
        Some(out)
    }

    /// Byte-span edit against `file`, verified against the current text of
    /// the range.
    pub fn to_edit(&self, doc: &TextDocument<'_>, file: impl Into<PathBuf>) -> Option<Edit> {
        if !self.is_available(doc.len()) {
            return None;
        }
        let start = doc.byte_offset(self.range.start);
        let end = doc.byte_offset(self.range.end);
        Some(Edit::new(
            file,
            start,
            end,
            self.replacement.clone(),
            &doc.text()[start..end],
        ))
    }
}
