//! Coarse query classification used by the router and the performance log.

use serde::{Deserialize, Serialize};

/// Category of a user query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Coding,
    Math,
    Science,
    Research,
    Writing,
    #[default]
    General,
}

const CODING_TERMS: &[&str] = &[
    "code", "function", "compile", "bug", "rust", "python", "javascript", "algorithm", "api",
    "debug", "program", "sql", "regex",
];
const MATH_TERMS: &[&str] = &[
    "equation", "integral", "derivative", "calculate", "solve", "proof", "theorem", "algebra",
    "matrix", "probability", "geometry", "sum",
];
const SCIENCE_TERMS: &[&str] = &[
    "physics", "chemistry", "biology", "molecule", "cell", "energy", "reaction", "atom",
    "force", "evolution", "enzyme", "protein",
];
const RESEARCH_TERMS: &[&str] = &[
    "research", "study", "studies", "paper", "papers", "literature", "evidence", "sources",
    "citation", "citations", "review", "survey",
];
const WRITING_TERMS: &[&str] = &[
    "essay", "write", "rewrite", "summarize", "summary", "poem", "story", "outline", "draft",
    "paragraph",
];

impl QueryCategory {
    pub fn as_str(&self) -> &str {
        match self {
            QueryCategory::Coding => "coding",
            QueryCategory::Math => "math",
            QueryCategory::Science => "science",
            QueryCategory::Research => "research",
            QueryCategory::Writing => "writing",
            QueryCategory::General => "general",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify a query by keyword hits; the category with most hits wins,
/// ties resolved in declaration order. Arithmetic operators count as math.
pub fn classify_query(text: &str) -> QueryCategory {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let hits = |terms: &[&str]| tokens.iter().filter(|t| terms.contains(t)).count();

    let arithmetic = lowered
        .chars()
        .zip(lowered.chars().skip(1))
        .filter(|(a, b)| a.is_ascii_digit() && matches!(b, '+' | '-' | '*' | '/' | '^' | '='))
        .count();

    let scored = [
        (QueryCategory::Coding, hits(CODING_TERMS)),
        (QueryCategory::Math, hits(MATH_TERMS) + arithmetic),
        (QueryCategory::Science, hits(SCIENCE_TERMS)),
        (QueryCategory::Research, hits(RESEARCH_TERMS)),
        (QueryCategory::Writing, hits(WRITING_TERMS)),
    ];

    let mut best = (QueryCategory::General, 0);
    for (category, count) in scored {
        if count > best.1 {
            best = (category, count);
        }
    }
    best.0
}
