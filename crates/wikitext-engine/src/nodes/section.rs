use std::cell::RefCell;
use std::rc::Rc;

use super::Node;
use crate::document::DocumentInner;
use crate::error::EditError;
use crate::sections::{first_line, header_level};
use crate::span::{Span, SpanKind};

/// A section: its header line (if any) plus everything down to the next
/// header of the same or a shallower level.
///
/// The lead section has no header; it reports level 0 and no title.
#[derive(Clone)]
pub struct Section {
    node: Node,
}

/// Splits a header line into its level, the raw title between the `=` runs
/// and the trailing spaces after the closing run. Only called when the
/// level is known to be non-zero.
fn header_parts(line: &str) -> (usize, &str, &str) {
    let stripped = line.trim_end_matches(' ');
    let trailing = &line[stripped.len()..];
    let level = header_level(line);
    (level, &stripped[level..stripped.len() - level], trailing)
}

impl Section {
    pub(crate) fn from_parts(doc: Rc<RefCell<DocumentInner>>, index: usize) -> Self {
        Self {
            node: Node::new(doc, SpanKind::Section, index),
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

    /// Header level 1 through 6, or 0 for the lead section and for
    /// malformed headers.
    pub fn level(&self) -> usize {
        header_level(first_line(&self.node.text()))
    }

    /// The header title with surrounding whitespace trimmed, or `None` at
    /// level 0.
    pub fn title(&self) -> Option<String> {
        let text = self.node.text();
        let line = first_line(&text);
        if header_level(line) == 0 {
            return None;
        }
        let (_, raw_title, _) = header_parts(line);
        Some(raw_title.trim().to_string())
    }

    /// Replaces the title, keeping the `=` runs and any trailing spaces.
    /// Fails on a section with no header line to hold a title.
    pub fn set_title(&mut self, new_title: &str) -> Result<(), EditError> {
        let text = self.node.text();
        let line = first_line(&text);
        if header_level(line) == 0 {
            return Err(EditError::LeadSectionTitle);
        }
        let (level, _, trailing) = header_parts(line);
        let equals = "=".repeat(level);
        let rest = &text[line.len()..];
        self.node
            .set_text(&[equals.as_str(), new_title, equals.as_str(), trailing, rest].concat());
        Ok(())
    }

    /// Everything below the header line; the whole text at level 0.
    pub fn contents(&self) -> String {
        let text = self.node.text();
        if header_level(first_line(&text)) == 0 {
            return text;
        }
        match text.find('\n') {
            Some(newline) => text[newline + 1..].to_string(),
            None => String::new(),
        }
    }

    pub fn set_contents(&mut self, new_contents: &str) {
        let text = self.node.text();
        let line = first_line(&text);
        if header_level(line) == 0 {
            self.node.set_text(new_contents);
            return;
        }
        self.node
            .set_text(&[line, "\n", new_contents].concat());
    }

    /// Rewrites the `=` runs to the clamped level, preserving title
    /// spacing. A no-op on the lead section.
    pub fn set_level(&mut self, new_level: usize) {
        let text = self.node.text();
        let line = first_line(&text);
        if header_level(line) == 0 {
            return;
        }
        let (_, raw_title, trailing) = header_parts(line);
        let equals = "=".repeat(new_level.clamp(1, 6));
        let rest = &text[line.len()..];
        self.node
            .set_text(&[equals.as_str(), raw_title, equals.as_str(), trailing, rest].concat());
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, EditError};
    use pretty_assertions::assert_eq;

    #[test]
    fn header_section_reports_level_title_and_contents() {
        let doc = Document::new("lead\n== Title ==\nbody\n");
        let sections = doc.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].level(), 0);
        assert_eq!(sections[0].title(), None);
        assert_eq!(sections[0].contents(), "lead\n");
        assert_eq!(sections[1].level(), 2);
        assert_eq!(sections[1].title(), Some("Title".to_string()));
        assert_eq!(sections[1].contents(), "body\n");
    }

    #[test]
    fn set_title_on_the_lead_section_fails() {
        let doc = Document::new("no headers here");
        let mut lead = doc.sections().remove(0);
        assert_eq!(lead.set_title("x"), Err(EditError::LeadSectionTitle));
        assert_eq!(doc.text(), "no headers here");
    }

    #[test]
    fn set_title_keeps_the_equals_runs() {
        let doc = Document::new("== Old ==\nbody");
        let mut section = doc.sections().remove(1);
        section.set_title(" New ").unwrap();
        assert_eq!(doc.text(), "== New ==\nbody");
    }

    #[test]
    fn set_level_preserves_title_spacing() {
        let doc = Document::new("== T ==\nbody");
        let mut section = doc.sections().remove(1);
        section.set_level(3);
        assert_eq!(doc.text(), "=== T ===\nbody");
        assert_eq!(section.level(), 3);
    }

    #[test]
    fn set_level_is_clamped_to_six() {
        let doc = Document::new("= T =\n");
        let mut section = doc.sections().remove(1);
        section.set_level(9);
        assert_eq!(doc.text(), "====== T ======\n");
    }

    #[test]
    fn set_contents_replaces_the_body_only() {
        let doc = Document::new("== T ==\nold body");
        let mut section = doc.sections().remove(1);
        section.set_contents("new body");
        assert_eq!(doc.text(), "== T ==\nnew body");
    }

    #[test]
    fn lead_section_covers_everything_without_headers() {
        let doc = Document::new("just text\nmore text");
        let sections = doc.sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].contents(), "just text\nmore text");
    }

    #[test]
    fn uneven_header_still_opens_a_section() {
        let doc = Document::new("lead\n== uneven =\nbody");
        let sections = doc.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].level(), 1);
    }
}
