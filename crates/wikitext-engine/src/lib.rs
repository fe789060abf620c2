//! Span-tracking wikitext engine.
//!
//! The engine keeps a single text buffer plus an append-only table of byte
//! spans for every structural construct it has found: templates, template
//! parameters, parser functions, wikilinks, comments, nowiki guards,
//! external links and sections. Nodes are typed views over `(category,
//! index)` pairs; they own no text and stay valid across edits because
//! every edit goes through one replace primitive that rebases the whole
//! table around the change. The buffer is tokenized once, lazily, and
//! never re-parsed.
//!
//! ```
//! use wikitext_engine::Document;
//!
//! let doc = Document::new("{{cite|title=Rust}}");
//! let mut template = doc.templates().remove(0);
//! template.set_name("citation");
//! assert_eq!(doc.text(), "{{citation|title=Rust}}");
//! ```

pub mod document;
pub mod error;
pub mod nodes;
pub mod span;

mod rebase;
mod sections;
mod tokenizer;

pub use document::Document;
pub use error::EditError;
pub use nodes::{
    Argument, Comment, ExternalLink, Parameter, ParserFunction, Section, Template, WikiLink,
};
pub use span::Span;
