use std::cell::RefCell;
use std::rc::Rc;

use super::Node;
use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// A `{{{name|default}}}` template parameter.
#[derive(Clone)]
pub struct Parameter {
    node: Node,
}

impl Parameter {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::Parameter, index),
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

    pub fn name(&self) -> String {
        let text = self.node.text();
        let end = self
            .node
            .first_unmasked(b'|')
            .unwrap_or_else(|| text.len().saturating_sub(3));
        text.get(3..end).unwrap_or("").to_string()
    }

    pub fn set_name(&mut self, new_name: &str) {
        let text = self.node.text();
        let tail = match self.node.first_unmasked(b'|') {
            Some(pipe) => text
                .get(pipe..text.len().saturating_sub(3))
                .unwrap_or("")
                .to_string(),
            None => String::new(),
        };
        self.node
            .set_text(&["{{{", new_name, tail.as_str(), "}}}"].concat());
    }

    /// The `|` separator, or an empty string when there is no default.
    pub fn pipe(&self) -> &'static str {
        if self.node.first_unmasked(b'|').is_some() {
            "|"
        } else {
            ""
        }
    }

    pub fn default(&self) -> Option<String> {
        let text = self.node.text();
        self.node.first_unmasked(b'|').map(|pipe| {
            text.get(pipe + 1..text.len().saturating_sub(3))
                .unwrap_or("")
                .to_string()
        })
    }

    pub fn set_default(&mut self, new_default: &str) {
        let name = self.name();
        self.node
            .set_text(&["{{{", name.as_str(), "|", new_default, "}}}"].concat());
    }

    /// Parameters nested inside this one (typically in its default).
    pub fn parameters(&self) -> Vec<Parameter> {
        self.node
            .nested_indices(SpanKind::Parameter)
            .into_iter()
            .map(|index| Parameter::from_parts(self.node.doc.clone(), index))
            .collect()
    }

    /// Appends `new_name` as the innermost default of the parameter chain:
    /// `{{{a|{{{b}}}}}}` gains `{{{a|{{{b|{{{new}}}}}}}}}`. A no-op when
    /// `new_name` already names this parameter.
    pub fn append_default(&mut self, new_name: &str) {
        let stripped = new_name.trim();
        if stripped == self.name().trim() {
            return;
        }
        let mut innermost = self.clone();
        loop {
            let Some(default) = innermost.default() else {
                break;
            };
            match innermost
                .parameters()
                .into_iter()
                .find(|nested| nested.text() == default)
            {
                Some(nested) => {
                    // The chain already falls back to this name.
                    if stripped == nested.name().trim() {
                        return;
                    }
                    innermost = nested;
                }
                None => break,
            }
        }
        let name = innermost.name();
        let new_text = match innermost.default() {
            None => ["{{{", name.as_str(), "|{{{", new_name, "}}}", "}}}"].concat(),
            Some(default) => [
                "{{{",
                name.as_str(),
                "|{{{",
                new_name,
                "|",
                default.as_str(),
                "}}}",
                "}}}",
            ]
            .concat(),
        };
        innermost.set_text(&new_text);
    }
}
