//! Typed views over recorded spans.
//!
//! A view is a `(category, index)` pair plus a handle on the shared
//! document state; it stores no text of its own. Accessors slice the
//! buffer through the node's current span, and every setter funnels into
//! the document's single replace primitive, so all views stay valid across
//! edits made through any of them.

mod argument;
mod comment;
mod external_link;
mod parameter;
mod parser_function;
mod section;
mod template;
mod wikilink;

pub use argument::Argument;
pub use comment::Comment;
pub use external_link::ExternalLink;
pub use parameter::Parameter;
pub use parser_function::ParserFunction;
pub use section::Section;
pub use template::Template;
pub use wikilink::WikiLink;

use std::cell::RefCell;
use std::rc::Rc;

use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// Shared plumbing behind every public node kind.
#[derive(Clone)]
pub(crate) struct Node {
    pub(crate) doc: Rc<RefCell<DocumentInner>>,
    pub(crate) kind: SpanKind,
    pub(crate) index: usize,
}

impl Node {
    pub(crate) fn new(doc: Rc<RefCell<DocumentInner>>, kind: SpanKind, index: usize) -> Self {
        Self { doc, kind, index }
    }

    pub(crate) fn span(&self) -> Span {
        self.doc.borrow().span_of(self.kind, self.index)
    }

    pub(crate) fn text(&self) -> String {
        let inner = self.doc.borrow();
        let span = inner.span_of(self.kind, self.index);
        inner.slice(span).into_owned()
    }

    pub(crate) fn set_text(&mut self, new_text: &str) {
        self.doc
            .borrow_mut()
            .replace_span(self.kind, self.index, new_text);
    }

    /// Node text with `open` leading and `close` trailing delimiter bytes
    /// stripped. Empty when an edit has mangled the node below that size.
    pub(crate) fn interior(&self, open: usize, close: usize) -> String {
        let text = self.text();
        let end = text.len().saturating_sub(close);
        text.get(open..end).unwrap_or("").to_string()
    }

    pub(crate) fn split_unmasked(&self, delimiter: u8) -> Vec<Span> {
        let inner = self.doc.borrow();
        let span = inner.span_of(self.kind, self.index);
        inner.split_unmasked(span, delimiter)
    }

    /// Offset (relative to the node) of the first `byte` not hidden inside
    /// a nested construct.
    pub(crate) fn first_unmasked(&self, byte: u8) -> Option<usize> {
        let inner = self.doc.borrow();
        let span = inner.span_of(self.kind, self.index);
        let text = inner.slice(span);
        text.bytes()
            .enumerate()
            .find(|&(i, b)| b == byte && !inner.in_nested_span(span, span.start + i))
            .map(|(i, _)| i)
    }

    /// Arena indices of `kind` spans lying strictly inside this node.
    pub(crate) fn nested_indices(&self, kind: SpanKind) -> Vec<usize> {
        let outer = self.span();
        let inner = self.doc.borrow();
        let Some(table) = inner.spans.as_ref() else {
            return Vec::new();
        };
        table
            .list(kind)
            .iter()
            .enumerate()
            .filter(|&(_, &span)| outer.contains_strictly(span))
            .map(|(index, _)| index)
            .collect()
    }

    /// Registers `spans` in the arena under `kind`, reusing identical
    /// entries, and returns their indices.
    pub(crate) fn register_all(&self, kind: SpanKind, spans: Vec<Span>) -> Vec<usize> {
        let mut inner = self.doc.borrow_mut();
        let table = inner.table();
        spans
            .into_iter()
            .map(|span| table.index_of_or_push(kind, span))
            .collect()
    }
}
