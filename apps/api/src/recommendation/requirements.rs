//! Requirement Extractor: keyword signals in the query mapped to assessment categories.
//!
//! Matching is a plain substring test on the lower-cased query, not token
//! based. Short keywords can therefore fire inside unrelated words
//! ("engineer" inside "reengineered"). Callers rely on this exact behaviour.

use std::collections::BTreeSet;

use crate::models::assessment::Category;

const TECHNICAL_KEYWORDS: &[&str] = &[
    "java",
    "python",
    "sql",
    "javascript",
    "programming",
    "coding",
    "technical",
    "developer",
    "engineer",
];

const BEHAVIORAL_KEYWORDS: &[&str] = &[
    "collaborate",
    "teamwork",
    "communication",
    "leadership",
    "personality",
    "behavior",
];

const COGNITIVE_KEYWORDS: &[&str] = &["cognitive", "analytical", "problem-solving", "reasoning"];

const COMPETENCY_KEYWORDS: &[&str] = &[
    "competency",
    "competencies",
    "strategic",
    "decision-making",
    "stakeholder",
];

/// Category intent detected in a single query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Requirements {
    pub needed_categories: BTreeSet<Category>,
    pub technical_skills: Vec<String>,
    pub behavioral_skills: Vec<String>,
    pub cognitive_signals: Vec<String>,
    pub competency_signals: Vec<String>,
}

impl Requirements {
    /// No category signal: rank purely by similarity.
    pub fn is_empty(&self) -> bool {
        self.needed_categories.is_empty()
    }
}

fn matched(query_lower: &str, table: &[&str]) -> Vec<String> {
    table
        .iter()
        .filter(|kw| query_lower.contains(**kw))
        .map(|kw| kw.to_string())
        .collect()
}

/// Scans the query against the four keyword tables.
pub fn extract_requirements(query: &str) -> Requirements {
    let query_lower = query.to_lowercase();

    let technical_skills = matched(&query_lower, TECHNICAL_KEYWORDS);
    let behavioral_skills = matched(&query_lower, BEHAVIORAL_KEYWORDS);
    let cognitive_signals = matched(&query_lower, COGNITIVE_KEYWORDS);
    let competency_signals = matched(&query_lower, COMPETENCY_KEYWORDS);

    let mut needed_categories = BTreeSet::new();
    for (hits, category) in [
        (&technical_skills, Category::Knowledge),
        (&behavioral_skills, Category::Personality),
        (&cognitive_signals, Category::Ability),
        (&competency_signals, Category::Competency),
    ] {
        if !hits.is_empty() {
            needed_categories.insert(category);
        }
    }

    Requirements {
        needed_categories,
        technical_skills,
        behavioral_skills,
        cognitive_signals,
        competency_signals,
    }
}
