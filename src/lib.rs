//! Splint Patcher: exclusion editing and diagnostic placement for splint
//!
//! Two independent halves:
//!
//! - [`exclude`] adds file exclusions to a project's `.splint.edn` by
//!   surgical text edits, leaving formatting and comments of unrelated
//!   entries untouched.
//! - [`diagnostics`] decodes splint's `--output json` stream and maps each
//!   record onto the current text of the file it refers to.
//!
//! # Architecture
//!
//! Every file change compiles down to a single primitive: [`Edit`], a
//! verified byte-span replacement written atomically (tempfile + fsync +
//! rename). Config patches and quick fixes only differ in how the span is
//! found.
//!
//! `.splint.edn` is never parsed as a whole. [`edn`] locates the few
//! structural shapes an exclusion needs (a rule's `{...}` body and its
//! `:excludes [...]` vector) while skipping string literals and comments.
//!
//! # Example
//!
//! ```no_run
//! use splint_patcher::exclude::{add_exclusion, rule_has_exclusion};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! if !rule_has_exclusion(root, "lint/eq-nil", "glob:**/foo.clj") {
//!     match add_exclusion(root, "lint/eq-nil", "glob:**/foo.clj") {
//!         Ok(strategy) => println!("excluded via {}", strategy),
//!         Err(e) => eprintln!("exclusion failed: {}", e),
//!     }
//! }
//! ```

pub mod diagnostics;
pub mod edit;
pub mod edn;
pub mod exclude;
pub mod settings;

// Re-exports
pub use diagnostics::{
    annotate, decode, map_range, Annotation, DiagnosticRecord, Document, QuickFix, Severity,
    TextDocument, TextRange,
};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use exclude::{add_exclusion, rule_has_exclusion, ExcludeError, ExclusionQuery, Strategy};
pub use settings::{Settings, SettingsError};
