use std::cell::RefCell;
use std::rc::Rc;

use super::Node;
use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// An HTML comment, `<!-- contents -->`.
#[derive(Clone)]
pub struct Comment {
    node: Node,
}

impl Comment {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::Comment, index),
        }
    }

    pub fn span(&self) -> Span {
        self.node.span()
    }

    pub fn text(&self) -> String {
        self.node.text()
    }

    pub fn set_text(&mut self, new_text: &str) {
        self.node.set_text(new_text);
    }

    pub fn contents(&self) -> String {
        self.node.interior(4, 3)
    }
}
