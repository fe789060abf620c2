//! Keeps every recorded span consistent after an in-place buffer edit.
//!
//! An edit is always a single contiguous replace, modelled as growth or
//! shrinkage anchored at the edit's start offset. Both passes are linear
//! over the whole table and preserve `start <= end` for every span; a span
//! whose entire range is removed becomes degenerate at the removal point
//! instead of being deleted, so node identities survive content loss.

use crate::span::{Span, SpanTable};

/// Shifts or widens spans after `added` bytes were inserted at `at`.
///
/// Spans starting after the insertion move right; spans covering it grow;
/// spans ending at or before it (degenerate ones at `at` included) are
/// untouched.
pub(crate) fn extend(table: &mut SpanTable, at: usize, added: usize) {
    tracing::trace!(at, added, "extending spans");
    for span in table.iter_mut() {
        if at < span.start {
            span.start += added;
            span.end += added;
        } else if span.covers(at) {
            span.end += added;
        }
    }
}

/// Updates spans after the byte range `[remove_start, remove_end)` was
/// deleted from the buffer.
pub(crate) fn shrink(table: &mut SpanTable, remove_start: usize, remove_end: usize) {
    let removed = remove_end - remove_start;
    tracing::trace!(remove_start, remove_end, "shrinking spans");
    for span in table.iter_mut() {
        if span.end <= remove_start {
            // Entirely before the removal.
        } else if remove_end <= span.start {
            // Entirely after: shift left.
            span.start -= removed;
            span.end -= removed;
        } else if remove_start < span.start {
            // Removal eats into (or past) the span's head.
            *span = if remove_end <= span.end {
                Span {
                    start: remove_start,
                    end: span.end - removed,
                }
            } else {
                Span {
                    start: remove_start,
                    end: remove_start,
                }
            };
        } else if remove_end <= span.end {
            // Removal is inside the span.
            span.end -= removed;
        } else {
            // Removal eats the span's tail.
            span.end = remove_start;
        }
    }
}
