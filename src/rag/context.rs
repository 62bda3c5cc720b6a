//! Context assembly from retrieved reviews

use crate::models::RetrievedMatch;

/// Shown when a review carries no star rating
const MISSING_STARS: &str = "n/a";

/// Assembler that serializes retrieved reviews into prompt text
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Serialize every match, in retrieval order
    #[must_use]
    pub fn assemble(&self, matches: &[RetrievedMatch]) -> String {
        matches.iter().map(|m| self.format_match(m)).collect()
    }

    /// Append the retrieved context after the user's own words
    #[must_use]
    pub fn augment(&self, content: &str, matches: &[RetrievedMatch]) -> String {
        let mut augmented = String::with_capacity(content.len() + matches.len() * 256);
        augmented.push_str(content);
        augmented.push_str(&self.assemble(matches));
        augmented
    }

    /// Format a single match as one block, followed by blank lines
    #[must_use]
    pub fn format_match(&self, m: &RetrievedMatch) -> String {
        let stars = m
            .metadata
            .stars
            .as_ref()
            .map_or_else(|| MISSING_STARS.to_string(), |s| s.to_string());

        format!(
            "\nReturned Results:\nProfessor: {}\nReview: {}\nSubject: {}\nStars: {}\n\n\n",
            m.id, m.metadata.review, m.metadata.subject, stars
        )
    }
}
