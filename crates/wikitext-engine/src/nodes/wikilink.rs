use std::cell::RefCell;
use std::rc::Rc;

use super::Node;
use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// A `[[target]]` or `[[target|display text]]` internal link.
#[derive(Clone)]
pub struct WikiLink {
    node: Node,
}

impl WikiLink {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::WikiLink, index),
        }
    }

    pub fn span(&self) -> Span {
        self.node.span()
    }

    /// The link's full source text, brackets included.
    pub fn source(&self) -> String {
        self.node.text()
    }

    pub fn target(&self) -> String {
        let text = self.node.text();
        let end = self
            .node
            .first_unmasked(b'|')
            .unwrap_or_else(|| text.len().saturating_sub(2));
        text.get(2..end).unwrap_or("").to_string()
    }

    /// Retargets the link, keeping any display text.
    pub fn set_target(&mut self, new_target: &str) {
        let new_text = match self.text() {
            Some(display) => ["[[", new_target, "|", display.as_str(), "]]"].concat(),
            None => ["[[", new_target, "]]"].concat(),
        };
        self.node.set_text(&new_text);
    }

    /// The display text after the `|`, or `None` for a plain link.
    pub fn text(&self) -> Option<String> {
        let text = self.node.text();
        self.node.first_unmasked(b'|').map(|pipe| {
            text.get(pipe + 1..text.len().saturating_sub(2))
                .unwrap_or("")
                .to_string()
        })
    }

    /// Sets the display text, adding the `|` separator when needed.
    pub fn set_text(&mut self, new_text: &str) {
        let target = self.target();
        self.node
            .set_text(&["[[", target.as_str(), "|", new_text, "]]"].concat());
    }
}
