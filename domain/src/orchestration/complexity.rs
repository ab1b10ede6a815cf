//! Complexity Gate: decides between a direct answer and planning.
//!
//! ```text
//! document context present  => score 100, COMPLEX
//! otherwise                  => score = min(100, '?' * 20 + words * 2)
//!                               COMPLEX iff score > 40
//! ```

use crate::core::query::Query;
use serde::{Deserialize, Serialize};

/// Score above which a query is considered complex.
pub const COMPLEXITY_THRESHOLD: u8 = 40;

/// Score above which the plan generator asks for three branches instead of two.
pub const DEEP_BRANCH_SCORE: u8 = 80;

const QUESTION_MARK_WEIGHT: usize = 20;
const WORD_WEIGHT: usize = 2;

/// Outcome of the complexity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub score: u8,
    pub is_complex: bool,
}

impl ComplexityAssessment {
    /// Number of candidate plans to request from the planner.
    pub fn branch_count(&self) -> usize {
        self.branch_count_above(DEEP_BRANCH_SCORE)
    }

    /// Three branches when the score exceeds `deep_score`, else two.
    pub fn branch_count_above(&self, deep_score: u8) -> usize {
        if self.score > deep_score { 3 } else { 2 }
    }

    pub fn label(&self) -> &'static str {
        if self.is_complex { "COMPLEX" } else { "SIMPLE" }
    }
}

/// Score a query with the default threshold.
pub fn assess(query: &Query) -> ComplexityAssessment {
    assess_with_threshold(query, COMPLEXITY_THRESHOLD)
}

/// Score a query against a configurable threshold.
pub fn assess_with_threshold(query: &Query, threshold: u8) -> ComplexityAssessment {
    if query.context().has_document() {
        return ComplexityAssessment {
            score: 100,
            is_complex: true,
        };
    }

    let raw = query.question_marks() * QUESTION_MARK_WEIGHT + query.word_count() * WORD_WEIGHT;
    let score = raw.min(100) as u8;

    ComplexityAssessment {
        score,
        is_complex: score > threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::RequestContext;

    #[test]
    fn test_short_arithmetic_is_simple() {
        let result = assess(&Query::plain("What is 2+2?"));
        // 1 question mark (20) + 3 words (6)
        assert_eq!(result.score, 26);
        assert!(!result.is_complex);
    }

    #[test]
    fn test_short_statements_without_questions_are_simple() {
        for words in 0..15 {
            let text = vec!["word"; words].join(" ");
            assert!(!assess(&Query::plain(text)).is_complex, "{words} words");
        }
    }

    #[test]
    fn test_empty_and_whitespace_are_simple() {
        assert_eq!(assess(&Query::plain("")).score, 0);
        assert!(!assess(&Query::plain("   \n\t ")).is_complex);
    }

    #[test]
    fn test_document_context_forces_max_score() {
        let query = Query::new("hi", RequestContext::new().with_document("doc-42"));
        let result = assess(&query);
        assert_eq!(result.score, 100);
        assert!(result.is_complex);
    }

    #[test]
    fn test_score_is_capped() {
        let text = "why? ".repeat(20);
        assert_eq!(assess(&Query::plain(text)).score, 100);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 20 words => exactly 40, not complex
        let text = vec!["word"; 20].join(" ");
        let result = assess(&Query::plain(text));
        assert_eq!(result.score, 40);
        assert!(!result.is_complex);
    }

    #[test]
    fn test_branch_count() {
        let shallow = ComplexityAssessment {
            score: 80,
            is_complex: true,
        };
        let deep = ComplexityAssessment {
            score: 81,
            is_complex: true,
        };
        assert_eq!(shallow.branch_count(), 2);
        assert_eq!(deep.branch_count(), 3);
    }
}
