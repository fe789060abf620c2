use std::cell::RefCell;
use std::rc::Rc;

use super::Node;
use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// A bare URL or a single-bracket `[url text]` external link.
#[derive(Clone)]
pub struct ExternalLink {
    node: Node,
}

impl ExternalLink {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::ExternalLink, index),
        }
    }

    pub fn span(&self) -> Span {
        self.node.span()
    }

    /// The link's full source text, brackets included.
    pub fn source(&self) -> String {
        self.node.text()
    }

    pub fn in_brackets(&self) -> bool {
        self.node.text().starts_with('[')
    }

    pub fn url(&self) -> String {
        let text = self.node.text();
        if !self.in_brackets() {
            return text;
        }
        let interior = self.node.interior(1, 1);
        match interior.find(' ') {
            Some(space) => interior[..space].to_string(),
            None => interior,
        }
    }

    pub fn set_url(&mut self, new_url: &str) {
        if !self.in_brackets() {
            self.node.set_text(new_url);
            return;
        }
        let interior = self.node.interior(1, 1);
        let tail = match interior.find(' ') {
            Some(space) => &interior[space..],
            None => "",
        };
        self.node.set_text(&["[", new_url, tail, "]"].concat());
    }

    /// The display text of a bracketed link; `None` for a bare URL or a
    /// bracketed link without text.
    pub fn text(&self) -> Option<String> {
        if !self.in_brackets() {
            return None;
        }
        let interior = self.node.interior(1, 1);
        interior
            .find(' ')
            .map(|space| interior[space + 1..].to_string())
    }

    /// Sets the display text, putting a bare URL into brackets first.
    pub fn set_text(&mut self, new_text: &str) {
        let url = self.url();
        self.node
            .set_text(&["[", url.as_str(), " ", new_text, "]"].concat());
    }
}
