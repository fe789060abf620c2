//! Masking-based fixpoint tokenizer for brace constructs.
//!
//! Wikitext nesting is not context-free, so instead of a grammar the
//! tokenizer repeatedly matches the innermost remaining construct and then
//! overwrites its delimiters in a scratch copy with same-length filler.
//! Offsets recorded along the way therefore stay valid for the real buffer,
//! and each pass of the loop resolves one more nesting level. Malformed
//! input never fails; it just produces fewer spans.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::span::{Span, SpanTable};

const FILLER: u8 = b'_';

/// Characters MediaWiki allows in wikilink targets and template names.
const TITLE_CHARS: &str = r"[^\x00-\x1f|{}\[\]<>\n]*";

/// URL body characters for external links.
const EXTLINK_CHARS: &str = r#"[^ \\^`#<>\[\]"\t\n{|}]*"#;

/// Scheme allow-list for external links. The bracketed form additionally
/// accepts the protocol-relative `//` prefix.
const EXTLINK_SCHEMES: &str = "bitcoin:|ftp://|ftps://|geo:|git://|gopher://|http://|https://|\
     irc://|ircs://|magnet:|mailto:|mms://|news:|nntp://|redis://|\
     sftp://|sip:|sips:|sms:|ssh://|svn://|tel:|telnet://|urn:|\
     worldwind://|xmpp:";

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static NOWIKI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<nowiki\s*.*?>.*?</nowiki\s*>").unwrap());

static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"\[\[", TITLE_CHARS, r"(?:\]\]|\|(?s:.)*?\]\])"].concat()).unwrap()
});

static PARAMETER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{\{[^{}]*?\}\}\}").unwrap());

static PARSER_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*#\S*:[^{}]*?\}\}").unwrap());

static TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&[r"\{\{\s*", TITLE_CHARS, r"\s*(?:\|[^{}]*?\}\}|\}\})"].concat()).unwrap()
});

/// Bare links first, bracketed links as the fallback alternative; matching
/// is case-insensitive over the scheme.
pub(crate) static EXTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    let bare = ["(?:", EXTLINK_SCHEMES, ")", EXTLINK_CHARS].concat();
    let bracketed = [
        r"\[(?:",
        EXTLINK_SCHEMES,
        "|//)",
        EXTLINK_CHARS,
        r" *[^\]\n]*\]",
    ]
    .concat();
    Regex::new(&["(?i)", bare.as_str(), "|", bracketed.as_str()].concat()).unwrap()
});

/// Computes the initial span table for `text`.
///
/// Total function: every input produces a table, unbalanced markup simply
/// contributes nothing. Spans within a category are recorded innermost
/// first and are either disjoint or nested, never partially overlapping.
pub(crate) fn tokenize(text: &str) -> SpanTable {
    let mut table = SpanTable::default();
    let mut masked = text.as_bytes().to_vec();

    // Comments and nowiki guards hide everything inside them, so they are
    // recorded and blanked out before any other pattern runs.
    for (start, end) in matches_of(&COMMENT, &masked) {
        table.comments.push(Span { start, end });
        mask(&mut masked[start..end]);
    }
    for (start, end) in matches_of(&NOWIKI, &masked) {
        table.nowikis.push(Span { start, end });
        mask(&mut masked[start..end]);
    }

    // A wikilink's display text may contain braces that would otherwise
    // look like template syntax; hide just those bytes.
    for (start, end) in matches_of(&WIKILINK, &masked) {
        table.wikilinks.push(Span { start, end });
        for byte in &mut masked[start..end] {
            if *byte == b'{' || *byte == b'}' {
                *byte = FILLER;
            }
        }
    }

    // Fixpoint: each pass neutralizes braces that can no longer open or
    // close anything, then records parameters, parser functions and
    // templates in that priority order. Masking a match's delimiters makes
    // it opaque to the following passes, so the loop climbs one nesting
    // level per iteration and stops when a full pass finds nothing.
    let mut passes = 0usize;
    loop {
        passes += 1;
        neutralize_stray_braces(&mut masked);
        let mut matched = false;

        while let Some((start, end)) = first_match(&PARAMETER, &masked) {
            table.parameters.push(Span { start, end });
            mask(&mut masked[start..start + 3]);
            mask(&mut masked[end - 3..end]);
            matched = true;
        }
        while let Some((start, end)) = first_match(&PARSER_FUNCTION, &masked) {
            table.parser_functions.push(Span { start, end });
            mask(&mut masked[start..start + 2]);
            mask(&mut masked[end - 2..end]);
            matched = true;
        }
        while let Some((start, end)) = first_template(&masked) {
            table.templates.push(Span { start, end });
            mask(&mut masked[start..start + 2]);
            mask(&mut masked[end - 2..end]);
            matched = true;
        }

        if !matched {
            break;
        }
    }
    tracing::debug!(passes, "tokenizer fixpoint settled");

    table
}

fn matches_of(re: &Regex, haystack: &[u8]) -> Vec<(usize, usize)> {
    re.find_iter(haystack)
        .map(|m| (m.start(), m.end()))
        .collect()
}

fn first_match(re: &Regex, haystack: &[u8]) -> Option<(usize, usize)> {
    re.find(haystack).map(|m| (m.start(), m.end()))
}

/// First double-brace match that really is a template: a match flanked by
/// an extra `{` before and `}` after is part of a triple-brace parameter
/// and must be left for the parameter pass.
fn first_template(masked: &[u8]) -> Option<(usize, usize)> {
    TEMPLATE.find_iter(masked).find_map(|m| {
        let extra_open = m.start() > 0 && masked[m.start() - 1] == b'{';
        let extra_close = masked.get(m.end()) == Some(&b'}');
        (!(extra_open && extra_close)).then_some((m.start(), m.end()))
    })
}

fn mask(bytes: &mut [u8]) {
    for byte in bytes {
        *byte = FILLER;
    }
}

/// Blanks braces that cannot take part in any remaining match: a `{` or `}`
/// outside a double run, every opener after the last closer, and every
/// closer before the first opener. The adjacency rules read from a snapshot
/// so earlier replacements in the same sweep cannot create new "lone"
/// braces.
fn neutralize_stray_braces(masked: &mut [u8]) {
    let n = masked.len();
    let snapshot = masked.to_vec();
    for i in 0..n {
        let lone_open = snapshot[i] == b'{'
            && (i == 0 || snapshot[i - 1] != b'{')
            && i + 1 < n
            && snapshot[i + 1] != b'{';
        let lone_close = snapshot[i] == b'}'
            && (i == 0 || snapshot[i - 1] != b'}')
            && i + 1 < n
            && snapshot[i + 1] != b'}';
        if lone_open || lone_close {
            masked[i] = FILLER;
        }
    }

    let after_last_close = masked
        .iter()
        .rposition(|&b| b == b'}')
        .map_or(0, |pos| pos + 1);
    for byte in &mut masked[after_last_close..] {
        if *byte == b'{' {
            *byte = FILLER;
        }
    }
    let first_open = masked.iter().position(|&b| b == b'{').unwrap_or(n);
    for byte in &mut masked[..first_open] {
        if *byte == b'}' {
            *byte = FILLER;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_templates_resolve_innermost_first() {
        let table = tokenize("{{a|{{b|c}}}}");
        assert_eq!(
            table.templates,
            vec![Span { start: 4, end: 11 }, Span { start: 0, end: 13 }]
        );
        assert!(table.parameters.is_empty());
        assert!(table.parser_functions.is_empty());
    }

    #[test]
    fn triple_braces_win_over_templates() {
        let table = tokenize("{{{x|default}}}");
        assert_eq!(table.parameters, vec![Span { start: 0, end: 15 }]);
        assert!(table.templates.is_empty());
    }

    #[test]
    fn parser_function_requires_hash_and_colon() {
        let table = tokenize("{{#if:x|y|z}}");
        assert_eq!(table.parser_functions, vec![Span { start: 0, end: 13 }]);
        assert!(table.templates.is_empty());
    }

    #[test]
    fn parameter_nested_in_template() {
        let table = tokenize("{{t|{{{p|d}}}}}");
        assert_eq!(table.parameters, vec![Span { start: 4, end: 13 }]);
        assert_eq!(table.templates, vec![Span { start: 0, end: 15 }]);
    }

    #[test]
    fn comments_hide_brace_syntax() {
        let table = tokenize("<!-- {{a}} -->");
        assert_eq!(table.comments, vec![Span { start: 0, end: 14 }]);
        assert!(table.templates.is_empty());
    }

    #[test]
    fn nowiki_hides_brace_syntax() {
        let table = tokenize("<nowiki>{{a}}</nowiki>");
        assert_eq!(table.nowikis, vec![Span { start: 0, end: 22 }]);
        assert!(table.templates.is_empty());
    }

    #[test]
    fn wikilink_text_braces_are_opaque() {
        let table = tokenize("[[a|{{b}}]]");
        assert_eq!(table.wikilinks, vec![Span { start: 0, end: 11 }]);
        assert!(table.templates.is_empty());
    }

    #[test]
    fn unbalanced_braces_produce_no_spans() {
        for text in ["{{a", "a}}", "{{a|b", "{ {{", "}} {{"] {
            let table = tokenize(text);
            assert!(table.templates.is_empty(), "unexpected span in {text:?}");
            assert!(table.parameters.is_empty());
        }
    }

    #[test]
    fn stray_braces_do_not_block_real_matches() {
        let table = tokenize("{ {{a}} }");
        assert_eq!(table.templates, vec![Span { start: 2, end: 7 }]);
    }

    #[test]
    fn sibling_templates_both_recorded() {
        let table = tokenize("{{a}} {{a}}");
        assert_eq!(
            table.templates,
            vec![Span { start: 0, end: 5 }, Span { start: 6, end: 11 }]
        );
    }

    #[test]
    fn external_link_pattern_matches_bare_and_bracketed() {
        let found = matches_of(&EXTERNAL_LINK, b"see https://example.org/x and [ftp://host docs]");
        assert_eq!(found, vec![(4, 25), (30, 47)]);
    }

    #[test]
    fn external_link_scheme_is_case_insensitive() {
        let found = matches_of(&EXTERNAL_LINK, b"HTTPS://EXAMPLE.ORG");
        assert_eq!(found, vec![(0, 19)]);
    }

    #[test]
    fn protocol_relative_links_need_brackets() {
        assert!(matches_of(&EXTERNAL_LINK, b"//example.org").is_empty());
        assert_eq!(matches_of(&EXTERNAL_LINK, b"[//example.org x]"), vec![(0, 17)]);
    }
}
