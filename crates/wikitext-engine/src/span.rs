use std::collections::HashMap;

/// A byte range `[start, end)` into the document buffer.
///
/// All structural nodes store spans rather than copied text; slicing the
/// buffer with a node's current span reproduces its exact source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True when `other` lies strictly inside this span (shared edges do
    /// not count).
    pub(crate) fn contains_strictly(self, other: Span) -> bool {
        self.start < other.start && other.end < self.end
    }

    /// True when `offset` falls inside `[start, end)`.
    pub(crate) fn covers(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// The node kind an argument list hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ArgOwner {
    Template,
    ParserFunction,
}

/// Identifies one owner's argument list, e.g. "arguments of template #3".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArgListKey {
    pub(crate) owner: ArgOwner,
    pub(crate) index: usize,
}

/// Span category. Together with an index into the category's list this
/// forms a node identity that is stable for the lifetime of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpanKind {
    Parameter,
    ParserFunction,
    Template,
    WikiLink,
    Comment,
    NoWiki,
    ExternalLink,
    Section,
    Arguments(ArgListKey),
}

/// Append-only arena of spans, one ordered list per category.
///
/// Entries are never removed: an edit may shrink a span to zero length but
/// its slot persists, which is what keeps `(category, index)` identities
/// valid across arbitrary edit sequences. Lists grow in discovery order,
/// not textual order.
#[derive(Debug, Default, Clone)]
pub(crate) struct SpanTable {
    pub(crate) parameters: Vec<Span>,
    pub(crate) parser_functions: Vec<Span>,
    pub(crate) templates: Vec<Span>,
    pub(crate) wikilinks: Vec<Span>,
    pub(crate) comments: Vec<Span>,
    pub(crate) nowikis: Vec<Span>,
    pub(crate) external_links: Vec<Span>,
    pub(crate) sections: Vec<Span>,
    pub(crate) arguments: HashMap<ArgListKey, Vec<Span>>,
}

impl SpanTable {
    pub(crate) fn list(&self, kind: SpanKind) -> &[Span] {
        match kind {
            SpanKind::Parameter => &self.parameters,
            SpanKind::ParserFunction => &self.parser_functions,
            SpanKind::Template => &self.templates,
            SpanKind::WikiLink => &self.wikilinks,
            SpanKind::Comment => &self.comments,
            SpanKind::NoWiki => &self.nowikis,
            SpanKind::ExternalLink => &self.external_links,
            SpanKind::Section => &self.sections,
            SpanKind::Arguments(key) => {
                self.arguments.get(&key).map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    fn list_mut(&mut self, kind: SpanKind) -> &mut Vec<Span> {
        match kind {
            SpanKind::Parameter => &mut self.parameters,
            SpanKind::ParserFunction => &mut self.parser_functions,
            SpanKind::Template => &mut self.templates,
            SpanKind::WikiLink => &mut self.wikilinks,
            SpanKind::Comment => &mut self.comments,
            SpanKind::NoWiki => &mut self.nowikis,
            SpanKind::ExternalLink => &mut self.external_links,
            SpanKind::Section => &mut self.sections,
            SpanKind::Arguments(key) => self.arguments.entry(key).or_default(),
        }
    }

    pub(crate) fn get(&self, kind: SpanKind, index: usize) -> Option<Span> {
        self.list(kind).get(index).copied()
    }

    pub(crate) fn set(&mut self, kind: SpanKind, index: usize, span: Span) {
        if let Some(slot) = self.list_mut(kind).get_mut(index) {
            *slot = span;
        }
    }

    /// Returns the index of an identical existing entry, or appends `span`
    /// and returns its new index. Queries that re-derive spans (sections,
    /// external links, argument lists) go through this so repeated calls
    /// keep handing out the same identities.
    pub(crate) fn index_of_or_push(&mut self, kind: SpanKind, span: Span) -> usize {
        let list = self.list_mut(kind);
        match list.iter().position(|&existing| existing == span) {
            Some(index) => index,
            None => {
                list.push(span);
                list.len() - 1
            }
        }
    }

    /// Every span in the table, argument lists included. The rebase engine
    /// runs over this after each edit.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Span> {
        self.parameters
            .iter_mut()
            .chain(self.parser_functions.iter_mut())
            .chain(self.templates.iter_mut())
            .chain(self.wikilinks.iter_mut())
            .chain(self.comments.iter_mut())
            .chain(self.nowikis.iter_mut())
            .chain(self.external_links.iter_mut())
            .chain(self.sections.iter_mut())
            .chain(self.arguments.values_mut().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_of_or_push_reuses_identical_entries() {
        let mut table = SpanTable::default();
        let span = Span { start: 3, end: 9 };
        let first = table.index_of_or_push(SpanKind::Section, span);
        let second = table.index_of_or_push(SpanKind::Section, span);
        assert_eq!(first, second);
        assert_eq!(table.sections.len(), 1);

        let other = table.index_of_or_push(SpanKind::Section, Span { start: 9, end: 12 });
        assert_eq!(other, 1);
    }

    #[test]
    fn iter_mut_reaches_argument_lists() {
        let mut table = SpanTable::default();
        table.templates.push(Span { start: 0, end: 10 });
        let key = ArgListKey {
            owner: ArgOwner::Template,
            index: 0,
        };
        table.index_of_or_push(SpanKind::Arguments(key), Span { start: 3, end: 9 });
        assert_eq!(table.iter_mut().count(), 2);
    }

    #[test]
    fn strict_containment_excludes_shared_edges() {
        let outer = Span { start: 2, end: 10 };
        assert!(outer.contains_strictly(Span { start: 3, end: 9 }));
        assert!(!outer.contains_strictly(Span { start: 2, end: 9 }));
        assert!(!outer.contains_strictly(Span { start: 3, end: 10 }));
    }
}
