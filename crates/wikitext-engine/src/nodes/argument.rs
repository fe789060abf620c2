use super::Node;

/// One argument of a template or parser function.
///
/// The span includes the leading `|` (or the `:` for a parser function's
/// first argument). Positional arguments answer `name()` with their 1-based
/// position rendered as a string, counting only earlier siblings that are
/// still non-degenerate and carry no top-level `=`.
#[derive(Clone)]
pub struct Argument {
    pub(crate) node: Node,
}

impl Argument {
    pub fn span(&self) -> crate::Span {
        self.node.span()
    }

    pub fn text(&self) -> String {
        self.node.text()
    }

    pub fn set_text(&mut self, new_text: &str) {
        self.node.set_text(new_text);
    }

    /// True when the argument carries no `=` outside nested constructs.
    pub fn is_positional(&self) -> bool {
        self.node.first_unmasked(b'=').is_none()
    }

    pub fn name(&self) -> String {
        let text = self.node.text();
        match self.node.first_unmasked(b'=') {
            Some(eq) => text.get(1..eq).unwrap_or("").to_string(),
            None => self.position().to_string(),
        }
    }

    /// Rewrites the argument as `|name=value`, turning a positional
    /// argument into a keyword one.
    pub fn set_name(&mut self, new_name: &str) {
        let value = self.value();
        self.node
            .set_text(&["|", new_name, "=", value.as_str()].concat());
    }

    pub fn value(&self) -> String {
        let text = self.node.text();
        let from = match self.node.first_unmasked(b'=') {
            Some(eq) => eq + 1,
            None => 1,
        };
        text.get(from..).unwrap_or("").to_string()
    }

    /// Replaces the value, keeping the name (or the leading delimiter for a
    /// positional argument) untouched.
    pub fn set_value(&mut self, new_value: &str) {
        let text = self.node.text();
        let head_end = match self.node.first_unmasked(b'=') {
            Some(eq) => eq + 1,
            None => 1,
        };
        let head = text.get(..head_end).unwrap_or("").to_string();
        self.node.set_text(&[head.as_str(), new_value].concat());
    }

    /// 1-based position among the list's positional arguments.
    fn position(&self) -> usize {
        let inner = self.node.doc.borrow();
        let table = inner
            .spans
            .as_ref()
            .expect("argument views exist only after their list was derived");
        let list = table.list(self.node.kind);
        let mut position = 1;
        for &span in &list[..self.node.index] {
            if span.is_empty() {
                continue;
            }
            let text = inner.slice(span);
            let has_equals = text
                .bytes()
                .enumerate()
                .any(|(i, b)| b == b'=' && !inner.in_nested_span(span, span.start + i));
            if !has_equals {
                position += 1;
            }
        }
        position
    }
}
