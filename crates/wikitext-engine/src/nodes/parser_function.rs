use std::cell::RefCell;
use std::rc::Rc;

use super::template::{argument_spans, argument_views};
use super::{Argument, Node};
use crate::document::DocumentInner;
use crate::span::{ArgListKey, ArgOwner, Span, SpanKind};

/// A `{{#name:...}}` parser function call.
#[derive(Clone)]
pub struct ParserFunction {
    node: Node,
}

impl ParserFunction {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::ParserFunction, index),
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

    /// The function name: the text after the `#` and before the first `:`.
    pub fn name(&self) -> String {
        let text = self.node.text();
        let colon = text.find(':').unwrap_or(text.len());
        let head = text.get(..colon).unwrap_or("");
        match head.find('#') {
            Some(hash) => head[hash + 1..].to_string(),
            None => String::new(),
        }
    }

    /// Arguments in document order. Unlike a template there is no head to
    /// drop: the first argument starts at the `:` and the rest carry their
    /// leading `|`.
    pub fn arguments(&self) -> Vec<Argument> {
        let key = ArgListKey {
            owner: ArgOwner::ParserFunction,
            index: self.node.index,
        };
        let span = self.node.span();
        let text = self.node.text();
        let colon = text.find(':').unwrap_or(0);

        let segments = self.node.split_unmasked(b'|');
        let mut spans = vec![Span {
            start: span.start + colon,
            end: if segments.len() == 1 {
                segments[0].end.saturating_sub(2).max(span.start + colon)
            } else {
                segments[0].end
            },
        }];
        if segments.len() > 1 {
            spans.extend(argument_spans(&segments));
        }
        argument_views(&self.node, key, spans)
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_sits_between_hash_and_colon() {
        let doc = Document::new("{{#if:x|y|z}}");
        assert_eq!(doc.parser_functions()[0].name(), "if");
    }

    #[test]
    fn name_drops_whitespace_before_the_hash() {
        let doc = Document::new("{{ #invoke:Module|fn}}");
        assert_eq!(doc.parser_functions()[0].name(), "invoke");
    }

    #[test]
    fn first_argument_starts_at_the_colon() {
        let doc = Document::new("{{#if:x|y|z}}");
        let arguments = doc.parser_functions().remove(0).arguments();
        let texts: Vec<String> = arguments.iter().map(|a| a.text()).collect();
        assert_eq!(texts, vec![":x", "|y", "|z"]);
    }

    #[test]
    fn single_argument_function() {
        let doc = Document::new("{{#expr:1 + 2}}");
        let arguments = doc.parser_functions().remove(0).arguments();
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].text(), ":1 + 2");
        assert_eq!(arguments[0].value(), "1 + 2");
    }

    #[test]
    fn first_argument_is_positional() {
        let doc = Document::new("{{#tag:ref|body}}");
        let arguments = doc.parser_functions().remove(0).arguments();
        assert!(arguments[0].is_positional());
        assert_eq!(arguments[0].name(), "1");
        assert_eq!(arguments[1].value(), "body");
    }
}
