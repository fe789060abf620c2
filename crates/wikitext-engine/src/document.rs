//! The document: one shared buffer, one shared span table.
//!
//! `Document` is the sole owner of the text and of the span arena. Node
//! views hold reference-counted handles to the same state, so every view
//! observes every edit immediately. The table is computed lazily on the
//! first structural query and from then on is kept consistent by the
//! rebase engine alone; the buffer is never re-tokenized.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use xi_rope::Rope;
use xi_rope::delta::Builder as DeltaBuilder;

use crate::nodes::{
    Comment, ExternalLink, Parameter, ParserFunction, Section, Template, WikiLink,
};
use crate::span::{Span, SpanKind, SpanTable};
use crate::{rebase, sections, tokenizer};

/// Span categories that make a byte offset "masked" for delimiter
/// splitting: a delimiter inside any of these belongs to the nested
/// construct, not to the node being split.
const STRUCTURAL_KINDS: [SpanKind; 6] = [
    SpanKind::Template,
    SpanKind::Parameter,
    SpanKind::ParserFunction,
    SpanKind::WikiLink,
    SpanKind::Comment,
    SpanKind::NoWiki,
];

pub(crate) struct DocumentInner {
    buffer: Rope,
    pub(crate) spans: Option<SpanTable>,
    version: u64,
}

impl DocumentInner {
    fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            spans: None,
            version: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer.len()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Slice the buffer, clamping the range to the current bounds.
    pub(crate) fn slice(&self, span: Span) -> Cow<'_, str> {
        let len = self.buffer.len();
        let start = span.start.min(len);
        let end = span.end.min(len).max(start);
        self.buffer.slice_to_cow(start..end)
    }

    /// The span table, tokenizing the buffer on first use.
    pub(crate) fn table(&mut self) -> &mut SpanTable {
        if self.spans.is_none() {
            let text = self.buffer.to_string();
            self.spans = Some(tokenizer::tokenize(&text));
        }
        self.spans.as_mut().expect("span table just materialized")
    }

    pub(crate) fn span_of(&self, kind: SpanKind, index: usize) -> Span {
        self.spans
            .as_ref()
            .and_then(|table| table.get(kind, index))
            .expect("node view refers to a recorded span")
    }

    /// The single mutation primitive: write `new_text` over the node's
    /// current span, then rebase the whole table around the length delta.
    pub(crate) fn replace_span(&mut self, kind: SpanKind, index: usize, new_text: &str) {
        let span = self.span_of(kind, index);
        let old_len = span.len();

        let mut builder = DeltaBuilder::new(self.buffer.len());
        builder.replace(span.start..span.end, Rope::from(new_text));
        self.buffer = builder.build().apply(&self.buffer);

        let table = self.spans.as_mut().expect("span table exists for a view");
        if new_text.len() > old_len {
            rebase::extend(table, span.start, new_text.len() - old_len);
        } else if new_text.len() < old_len {
            rebase::shrink(table, span.start, span.start + (old_len - new_text.len()));
        }
        self.version += 1;
        tracing::trace!(
            start = span.start,
            old_len,
            new_len = new_text.len(),
            version = self.version,
            "replaced node text"
        );
    }

    /// Structural spans lying strictly inside `outer`.
    pub(crate) fn nested_spans(&self, outer: Span) -> Vec<Span> {
        let Some(table) = self.spans.as_ref() else {
            return Vec::new();
        };
        let mut nested = Vec::new();
        for kind in STRUCTURAL_KINDS {
            for &span in table.list(kind) {
                if outer.contains_strictly(span) {
                    nested.push(span);
                }
            }
        }
        nested
    }

    /// True when `offset` falls inside a structural construct nested
    /// strictly within `outer`.
    pub(crate) fn in_nested_span(&self, outer: Span, offset: usize) -> bool {
        self.nested_spans(outer)
            .iter()
            .any(|span| span.covers(offset))
    }

    /// Splits `outer` on `delimiter`, treating nested constructs as opaque:
    /// a delimiter byte inside one does not split. Returns the boundary
    /// spans between genuine occurrences; the final segment always runs to
    /// `outer.end`.
    pub(crate) fn split_unmasked(&self, outer: Span, delimiter: u8) -> Vec<Span> {
        let nested = self.nested_spans(outer);
        let text = self.slice(outer);
        let bytes = text.as_bytes();

        let mut segments = Vec::new();
        let mut segment_start = 0;
        for (i, &byte) in bytes.iter().enumerate() {
            if byte != delimiter {
                continue;
            }
            let absolute = outer.start + i;
            if nested.iter().any(|span| span.covers(absolute)) {
                continue;
            }
            segments.push(Span {
                start: outer.start + segment_start,
                end: absolute,
            });
            segment_start = i + 1;
        }
        segments.push(Span {
            start: outer.start + segment_start,
            end: outer.end,
        });
        segments
    }

    /// Re-derives external link spans from the current text, registering
    /// newly discovered ones in the arena.
    pub(crate) fn external_link_indices(&mut self) -> Vec<usize> {
        self.table();
        let text = self.text();
        let found: Vec<Span> = tokenizer::EXTERNAL_LINK
            .find_iter(text.as_bytes())
            .map(|m| Span {
                start: m.start(),
                end: m.end(),
            })
            .collect();
        let table = self.spans.as_mut().expect("span table materialized above");
        found
            .into_iter()
            .map(|span| table.index_of_or_push(SpanKind::ExternalLink, span))
            .collect()
    }
}

/// A live, mutable wikitext document.
///
/// Construction is cheap; the structural span table is built lazily on the
/// first query. All query methods return node views in discovery order,
/// which can diverge from left-to-right document order after edits --
/// callers needing sorted output must sort by span themselves.
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner::new(text))),
        }
    }

    /// Creates a document from raw bytes, validating UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// The current full text of the buffer.
    pub fn text(&self) -> String {
        self.inner.borrow().text()
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edit counter, incremented once per node replacement.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version()
    }

    pub fn parameters(&self) -> Vec<Parameter> {
        self.primary_nodes(SpanKind::Parameter, Parameter::from_parts)
    }

    pub fn parser_functions(&self) -> Vec<ParserFunction> {
        self.primary_nodes(SpanKind::ParserFunction, ParserFunction::from_parts)
    }

    pub fn templates(&self) -> Vec<Template> {
        self.primary_nodes(SpanKind::Template, Template::from_parts)
    }

    pub fn wikilinks(&self) -> Vec<WikiLink> {
        self.primary_nodes(SpanKind::WikiLink, WikiLink::from_parts)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.primary_nodes(SpanKind::Comment, Comment::from_parts)
    }

    pub fn external_links(&self) -> Vec<ExternalLink> {
        let indices = self.inner.borrow_mut().external_link_indices();
        indices
            .into_iter()
            .map(|index| ExternalLink::from_parts(self.inner.clone(), index))
            .collect()
    }

    /// The lead section followed by one section per header line. The lead
    /// section is always present, even when it is empty.
    pub fn sections(&self) -> Vec<Section> {
        let indices = sections::section_indices(&mut self.inner.borrow_mut());
        indices
            .into_iter()
            .map(|index| Section::from_parts(self.inner.clone(), index))
            .collect()
    }

    fn primary_nodes<T>(
        &self,
        kind: SpanKind,
        make: impl Fn(Rc<RefCell<DocumentInner>>, usize) -> T,
    ) -> Vec<T> {
        let count = self.inner.borrow_mut().table().list(kind).len();
        (0..count)
            .map(|index| make(self.inner.clone(), index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn all_spans(inner: &mut DocumentInner) -> Vec<Span> {
        inner.table().iter_mut().map(|span| *span).collect()
    }

    #[test]
    fn tokenization_is_lazy_and_cached() {
        let doc = Document::new("{{a}}");
        assert!(doc.inner.borrow().spans.is_none());
        assert_eq!(doc.templates().len(), 1);
        assert!(doc.inner.borrow().spans.is_some());
    }

    #[test]
    fn replacing_a_name_shifts_following_spans_only() {
        let doc = Document::new("{{a|1}}");
        let mut template = doc.templates().remove(0);
        let argument = template.arguments().remove(0);
        assert_eq!(argument.span(), Span { start: 3, end: 5 });

        template.set_name("alpha");
        assert_eq!(doc.text(), "{{alpha|1}}");
        assert_eq!(template.span(), Span { start: 0, end: 11 });
        assert_eq!(argument.span(), Span { start: 7, end: 9 });
        assert_eq!(argument.value(), "1");
        // No other category picked up spans.
        let inner = doc.inner.borrow();
        let table = inner.spans.as_ref().unwrap();
        assert!(table.parameters.is_empty());
        assert!(table.wikilinks.is_empty());
        assert!(table.sections.is_empty());
    }

    #[test]
    fn every_span_stays_in_bounds_through_edit_sequences() {
        let doc = Document::new("{{a|{{b|c}}}} [[x|y]] == h ==\ntail {{#if:p|q}}");
        doc.sections();
        doc.external_links();
        let edits: &[(usize, &str)] = &[(0, "{{longer|{{b|c}}}}"), (1, "{{b}}"), (0, "{{s}}")];
        for &(index, new_text) in edits {
            let mut template = doc.templates().remove(index);
            template.set_text(new_text);
            let len = doc.len();
            let mut inner = doc.inner.borrow_mut();
            for span in all_spans(&mut inner) {
                assert!(span.start <= span.end, "inverted span {span:?}");
                assert!(span.end <= len, "span {span:?} out of bounds {len}");
            }
        }
    }

    #[test]
    fn rebase_matches_retokenize_for_balanced_edits() {
        let doc = Document::new("intro {{a|1}} mid {{b|x={{c}}}} end");
        let mut template = doc.templates().remove(0);
        template.set_name("alpha");
        let mut other = doc.templates().remove(2);
        other.set_text("{{beta|x={{c}}}}");

        let fresh = tokenize(&doc.text());
        let inner = doc.inner.borrow();
        let table = inner.spans.as_ref().unwrap();
        let mut rebased: Vec<Span> = table
            .templates
            .iter()
            .copied()
            .filter(|span| !span.is_empty())
            .collect();
        let mut fresh_templates = fresh.templates.clone();
        rebased.sort();
        fresh_templates.sort();
        assert_eq!(rebased, fresh_templates);
    }

    #[test]
    fn split_unmasked_ignores_delimiters_in_nested_constructs() {
        let doc = Document::new("{{a|{{b|c}}|d}}");
        doc.templates();
        let inner = doc.inner.borrow();
        let outer = Span { start: 0, end: 15 };
        let segments = inner.split_unmasked(outer, b'|');
        assert_eq!(
            segments,
            vec![
                Span { start: 0, end: 3 },
                Span { start: 4, end: 11 },
                Span { start: 12, end: 15 },
            ]
        );
    }

    #[test]
    fn containment_query_is_strict() {
        let doc = Document::new("{{a|{{b|c}}}}");
        doc.templates();
        let inner = doc.inner.borrow();
        let outer = Span { start: 0, end: 13 };
        assert!(inner.in_nested_span(outer, 7));
        // The outer template itself does not mask its own offsets.
        assert!(!inner.in_nested_span(outer, 2));
    }

    #[test]
    fn from_bytes_rejects_invalid_utf8() {
        assert!(Document::from_bytes(&[0xff, 0xfe]).is_err());
        assert!(Document::from_bytes("{{ok}}".as_bytes()).is_ok());
    }

    #[test]
    fn aliasing_views_observe_the_same_edit() {
        let doc = Document::new("{{a}}");
        let mut first = doc.templates().remove(0);
        let second = doc.templates().remove(0);
        first.set_name("b");
        assert_eq!(second.name(), "b");
        assert_eq!(doc.version(), 1);
    }
}
