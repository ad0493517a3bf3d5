//! Catalog Store: loads assessment records once at startup.
//!
//! The source is a single path chosen by configuration. Any read or parse
//! failure degrades to the built-in sample set instead of failing startup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::assessment::{AssessmentRecord, Category, SupportFlag};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog contains no assessments")]
    Empty,
}

/// Raw catalog entry as found in the source JSON. Optional fields stay
/// untyped so one odd value costs that field its default, not the catalog.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    url: String,
    description: String,
    #[serde(default)]
    test_type: Option<Value>,
    #[serde(default)]
    skills: Option<Value>,
    #[serde(default)]
    adaptive_support: Option<Value>,
    #[serde(default)]
    remote_support: Option<Value>,
    #[serde(default)]
    duration: Option<Value>,
}

impl From<CatalogEntry> for AssessmentRecord {
    fn from(entry: CatalogEntry) -> Self {
        let name = entry.name;
        AssessmentRecord {
            category: category_field(&name, entry.test_type),
            skills: normalize_skills(skills_field(&name, entry.skills)),
            adaptive_support: support_field(
                &name,
                "adaptive_support",
                entry.adaptive_support,
                SupportFlag::No,
            ),
            remote_support: support_field(
                &name,
                "remote_support",
                entry.remote_support,
                SupportFlag::Yes,
            ),
            duration: duration_field(&name, entry.duration),
            name,
            url: entry.url,
            description: entry.description,
        }
    }
}

fn category_field(record: &str, value: Option<Value>) -> Category {
    match value {
        None => Category::default(),
        Some(Value::String(code)) => Category::parse(&code),
        // list form: first code wins
        Some(Value::Array(codes)) => match codes.first() {
            Some(Value::String(code)) => Category::parse(code),
            _ => {
                warn!("Assessment '{record}': unusable test_type list; using Other");
                Category::default()
            }
        },
        Some(other) => {
            warn!("Assessment '{record}': unrecognised test_type {other}; using Other");
            Category::default()
        }
    }
}

fn skills_field(record: &str, value: Option<Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(skill) => Some(skill),
                other => {
                    warn!("Assessment '{record}': dropping non-text skill {other}");
                    None
                }
            })
            .collect(),
        Some(Value::String(list)) => list.split(',').map(str::to_string).collect(),
        Some(other) => {
            warn!("Assessment '{record}': unrecognised skills {other}; using none");
            Vec::new()
        }
    }
}

fn support_field(
    record: &str,
    field: &str,
    value: Option<Value>,
    default: SupportFlag,
) -> SupportFlag {
    let parsed = match &value {
        None => return default,
        Some(Value::Bool(true)) => Some(SupportFlag::Yes),
        Some(Value::Bool(false)) => Some(SupportFlag::No),
        Some(Value::String(raw)) => SupportFlag::parse(raw),
        Some(_) => None,
    };
    parsed.unwrap_or_else(|| {
        if let Some(raw) = value {
            warn!(
                "Assessment '{record}': unrecognised {field} {raw}; using {}",
                default.as_str()
            );
        }
        default
    })
}

/// Whole minutes. Zero, negative and non-numeric values are absent.
fn duration_field(record: &str, value: Option<Value>) -> Option<u32> {
    let minutes = match value? {
        Value::Number(n) => match n.as_i64() {
            Some(whole) => return u32::try_from(whole).ok().filter(|m| *m > 0),
            None => n.as_f64(),
        },
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    };
    match minutes {
        Some(m) if m.is_finite() => (m > 0.0).then(|| m.round().max(1.0) as u32),
        _ => {
            warn!("Assessment '{record}': unrecognised duration; leaving it absent");
            None
        }
    }
}

/// Lower-cases and trims tags, dropping empties and repeats (first one wins).
fn normalize_skills(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Parses a catalog JSON array into records, applying field defaults.
pub fn parse_catalog(json: &str) -> Result<Vec<AssessmentRecord>, CatalogError> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(entries.into_iter().map(AssessmentRecord::from).collect())
}

fn read_catalog(path: &Path) -> Result<Vec<AssessmentRecord>, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json)
}

/// Loads the catalog from `source`, or the built-in sample set when no source
/// is configured or the source cannot be used.
pub fn load_catalog(source: Option<&Path>) -> Vec<AssessmentRecord> {
    let Some(path) = source else {
        info!("No catalog path configured; using built-in sample assessments");
        return sample_assessments();
    };

    match read_catalog(path) {
        Ok(records) => {
            info!("Loaded {} assessments from {}", records.len(), path.display());
            warn_on_duplicate_urls(&records);
            records
        }
        Err(e) => {
            let fallback = sample_assessments();
            warn!(
                "Catalog unavailable ({e}); falling back to {} built-in sample assessments",
                fallback.len()
            );
            fallback
        }
    }
}

/// Duplicate urls are kept; downstream identity is the catalog position.
fn warn_on_duplicate_urls(records: &[AssessmentRecord]) {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.url.as_str()) {
            warn!("Duplicate assessment url in catalog: {}", record.url);
        }
    }
}

fn sample(
    name: &str,
    slug: &str,
    description: &str,
    category: Category,
    skills: &[&str],
    adaptive_support: SupportFlag,
    duration: Option<u32>,
) -> AssessmentRecord {
    AssessmentRecord {
        name: name.to_string(),
        url: format!("https://www.shl.com/solutions/products/{slug}"),
        description: description.to_string(),
        category,
        skills: skills.iter().map(|s| s.to_string()).collect(),
        adaptive_support,
        remote_support: SupportFlag::Yes,
        duration,
    }
}

/// Built-in assessments used when the configured catalog cannot be loaded.
pub fn sample_assessments() -> Vec<AssessmentRecord> {
    vec![
        sample(
            "Java Programming Assessment",
            "java-assessment",
            "Evaluates Java programming skills and knowledge",
            Category::Knowledge,
            &["java", "programming", "technical"],
            SupportFlag::No,
            None,
        ),
        sample(
            "Teamwork and Collaboration Assessment",
            "teamwork-assessment",
            "Measures ability to work effectively in teams",
            Category::Personality,
            &["teamwork", "collaboration", "communication"],
            SupportFlag::No,
            None,
        ),
        sample(
            "Python Programming Assessment",
            "python-assessment",
            "Multiple-choice knowledge test covering Python syntax, the standard library and data handling",
            Category::Knowledge,
            &["python", "programming", "technical"],
            SupportFlag::No,
            Some(30),
        ),
        sample(
            "SQL Assessment",
            "sql-assessment",
            "Tests query writing, joins and relational database design",
            Category::Knowledge,
            &["sql", "database", "technical"],
            SupportFlag::No,
            Some(35),
        ),
        sample(
            "Occupational Personality Questionnaire",
            "occupational-personality-questionnaire",
            "Describes workplace behaviour and preferred ways of working with others",
            Category::Personality,
            &["personality", "behavior", "workplace"],
            SupportFlag::No,
            Some(25),
        ),
        sample(
            "Verify Cognitive Ability",
            "verify-cognitive-ability",
            "Adaptive measure of numerical, verbal and inductive reasoning",
            Category::Ability,
            &["cognitive", "reasoning", "analytical", "problem-solving"],
            SupportFlag::Yes,
            Some(20),
        ),
        sample(
            "Strategic Leadership Competency Report",
            "strategic-leadership-competency",
            "Assesses strategic thinking, decision-making and stakeholder management competencies",
            Category::Competency,
            &["strategic", "decision-making", "leadership", "stakeholder"],
            SupportFlag::No,
            Some(30),
        ),
        sample(
            "Situational Judgement Test",
            "situational-judgement",
            "Realistic workplace scenarios that measure judgement in context",
            Category::BehavioralSituational,
            &["judgement", "situational", "workplace"],
            SupportFlag::No,
            Some(30),
        ),
    ]
}
