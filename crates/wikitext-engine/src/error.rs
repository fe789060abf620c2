/// Errors surfaced by node setters.
///
/// The tokenizer and the rebase engine are total, so the only defined
/// failure in the whole engine is trying to give a title to a section that
/// has no header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("a lead section has no header line to hold a title")]
    LeadSectionTitle,
}
