//! Section boundaries layered on the shared span table.
//!
//! Boundary detection and level computation are deliberately independent
//! checks: any line framed by `=` opens a section, but the level only comes
//! out non-zero when the first line carries the strict symmetric
//! `== title ==` shape. A malformed header therefore still starts a section
//! and reports level 0.

use crate::document::DocumentInner;
use crate::span::{Span, SpanKind};

/// Loose boundary test: the line starts with `=` and, ignoring trailing
/// spaces, ends with `=` with at least one byte in between.
pub(crate) fn is_header_line(line: &str) -> bool {
    let line = line.trim_end_matches(' ');
    line.len() >= 3 && line.starts_with('=') && line.ends_with('=')
}

/// Strict level: the largest `k <= 6` such that the line starts and ends
/// with `k` equals signs around non-empty title text. 0 when the symmetric
/// pattern fails.
pub(crate) fn header_level(first_line: &str) -> usize {
    let line = first_line.trim_end_matches(' ');
    let bytes = line.as_bytes();
    let leading = bytes.iter().take_while(|&&b| b == b'=').count();
    let trailing = bytes.iter().rev().take_while(|&&b| b == b'=').count();
    if leading == 0 || trailing == 0 {
        return 0;
    }
    let mut level = leading.min(trailing).min(6);
    while level > 0 && 2 * level >= bytes.len() {
        level -= 1;
    }
    level
}

pub(crate) fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or("")
}

/// Partitions the buffer into a lead section plus one section per header
/// line, registering the spans in the arena (reusing identical entries) and
/// returning arena indices in discovery order.
///
/// Cascading extension: each newly found section is absorbed into every
/// immediately preceding section of strictly lower level, stopping at the
/// first one that is not. The lead section is never extended. This yields
/// "a header's text includes all of its subsections" without building a
/// tree.
pub(crate) fn section_indices(inner: &mut DocumentInner) -> Vec<usize> {
    inner.table();
    let text = inner.text();
    let doc_len = text.len();

    let mut header_starts = Vec::new();
    let mut pos = 0;
    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        if is_header_line(content) {
            header_starts.push(pos);
        }
        pos += line.len();
    }

    let table = inner
        .spans
        .as_mut()
        .expect("span table materialized above");
    let mut out = Vec::new();

    let lead_end = header_starts.first().copied().unwrap_or(doc_len);
    out.push(table.index_of_or_push(
        SpanKind::Section,
        Span {
            start: 0,
            end: lead_end,
        },
    ));

    for (i, &start) in header_starts.iter().enumerate() {
        let end = header_starts.get(i + 1).copied().unwrap_or(doc_len);
        let index = table.index_of_or_push(SpanKind::Section, Span { start, end });
        out.push(index);

        let new_level = header_level(first_line(&text[start..end]));
        for &prior in &out[1..out.len() - 1] {
            let Some(prior_span) = table.get(SpanKind::Section, prior) else {
                break;
            };
            let prior_level = header_level(first_line(&text[prior_span.start..prior_span.end]));
            if prior_level < new_level {
                table.set(
                    SpanKind::Section,
                    prior,
                    Span {
                        start: prior_span.start,
                        end,
                    },
                );
            } else {
                break;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("== Title ==", 2)]
    #[case("= x =", 1)]
    #[case("====== deep ======", 6)]
    #[case("======= over =======", 6)]
    #[case("===", 1)]
    #[case("==", 0)]
    #[case("== uneven =", 1)]
    #[case("== trailing ==   ", 2)]
    #[case("== tab ==\t", 0)]
    #[case("plain text", 0)]
    #[case("", 0)]
    fn level_follows_strict_symmetric_pattern(#[case] line: &str, #[case] expected: usize) {
        assert_eq!(header_level(line), expected);
    }

    #[rstest]
    #[case("== Title ==", true)]
    #[case("=x=", true)]
    #[case("= tab after close =\t", false)]
    #[case("==", false)]
    #[case("text = not a header =x", false)]
    #[case("== trailing spaces ==  ", true)]
    fn boundary_test_is_loose(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(is_header_line(line), expected);
    }
}
