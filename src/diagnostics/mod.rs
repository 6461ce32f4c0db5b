//! Turning splint output into placed, renderable annotations.
//!
//! [`decode`] reads the tool's line-oriented JSON output into
//! [`DiagnosticRecord`]s, [`map_range`] places each record on the current
//! text of the file, and [`annotate`] bundles both with an optional
//! [`QuickFix`] built from the record's suggested replacement.

pub mod annotation;
pub mod decoder;
pub mod range;
pub mod record;
pub mod tool;

pub use annotation::{annotate, Annotation, QuickFix};
pub use decoder::{decode, decode_line, SkipReason};
pub use range::{map_range, Document, TextDocument, TextRange};
pub use record::{DiagnosticRecord, Severity, DEFAULT_LEVEL, DEFAULT_MESSAGE};
pub use tool::{is_lintable_file, ToolFailure, ToolOutput};
