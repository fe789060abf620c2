use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::{Argument, Node};
use crate::document::DocumentInner;
use crate::span::{ArgListKey, ArgOwner, Span, SpanKind};

/// A `{{name|...}}` transclusion.
#[derive(Clone)]
pub struct Template {
    node: Node,
}

impl Template {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::Template, index),
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

    /// The raw name: everything between `{{` and the first top-level `|`,
    /// surrounding whitespace included.
    pub fn name(&self) -> String {
        let text = self.node.text();
        let end = self
            .node
            .first_unmasked(b'|')
            .unwrap_or_else(|| text.len().saturating_sub(2));
        text.get(2..end).unwrap_or("").to_string()
    }

    pub fn set_name(&mut self, new_name: &str) {
        let text = self.node.text();
        let tail = match self.node.first_unmasked(b'|') {
            Some(pipe) => text
                .get(pipe..text.len().saturating_sub(2))
                .unwrap_or("")
                .to_string(),
            None => String::new(),
        };
        self.node
            .set_text(&["{{", new_name, tail.as_str(), "}}"].concat());
    }

    /// Arguments in document order. Each span includes its leading `|`;
    /// the spans are registered in the arena so repeated calls hand back
    /// the same identities.
    pub fn arguments(&self) -> Vec<Argument> {
        let key = ArgListKey {
            owner: ArgOwner::Template,
            index: self.node.index,
        };
        let segments = self.node.split_unmasked(b'|');
        if segments.len() < 2 {
            return Vec::new();
        }
        argument_views(&self.node, key, argument_spans(&segments))
    }

    /// Removes every argument whose trimmed name reappears on a later
    /// argument, keeping the last occurrence. Values are not compared.
    pub fn rm_first_of_dup_args(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();
        for mut argument in self.arguments().into_iter().rev() {
            let name = argument.name().trim().to_string();
            if !seen.insert(name) {
                argument.set_text("");
            }
        }
    }

    /// Duplicate removal that never loses information: a duplicate name is
    /// dropped only when its value repeats a kept one or is empty (an empty
    /// kept duplicate yields to a non-empty earlier one). Conflicting
    /// non-empty values all survive; `tag`, when given, is appended to each
    /// surviving conflict's value to flag it for manual review.
    pub fn rm_dup_args_safe(&mut self, tag: Option<&str>) {
        let mut kept: HashMap<String, Vec<(Argument, String)>> = HashMap::new();
        for mut argument in self.arguments().into_iter().rev() {
            let name = argument.name().trim().to_string();
            let value = if argument.is_positional() {
                argument.value().trim().to_string()
            } else {
                argument.value()
            };
            let entries = match kept.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(vec![(argument, value)]);
                    continue;
                }
                Entry::Occupied(slot) => slot.into_mut(),
            };
            if value.is_empty() || entries.iter().any(|(_, kept_value)| *kept_value == value) {
                argument.set_text("");
            } else if let Some(empty) = entries
                .iter()
                .position(|(_, kept_value)| kept_value.is_empty())
            {
                let (mut stored, _) = entries.remove(empty);
                stored.set_text("");
                entries.push((argument, value));
            } else {
                if let Some(tag) = tag {
                    let tagged = [argument.value(), tag.to_string()].concat();
                    argument.set_value(&tagged);
                }
                entries.push((argument, value));
            }
        }
    }
}

/// Converts `|`-split segments of a double-brace node into argument spans:
/// the head segment (the name part) is dropped, every argument absorbs its
/// leading `|`, and the last one sheds the closing `}}`.
pub(super) fn argument_spans(segments: &[Span]) -> Vec<Span> {
    let last = segments.len() - 1;
    segments
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, segment)| {
            let start = segment.start.saturating_sub(1);
            let end = if i == last {
                segment.end.saturating_sub(2)
            } else {
                segment.end
            };
            Span {
                start,
                end: end.max(start),
            }
        })
        .collect()
}

pub(super) fn argument_views(node: &Node, key: ArgListKey, spans: Vec<Span>) -> Vec<Argument> {
    let kind = SpanKind::Arguments(key);
    node.register_all(kind, spans)
        .into_iter()
        .map(|index| Argument {
            node: Node::new(node.doc.clone(), kind, index),
        })
        .collect()
}
