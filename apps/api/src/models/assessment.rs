use std::fmt;

use serde::{Serialize, Serializer};

/// Coarse classification of an assessment (`test_type` in the catalog).
///
/// Serialized as the one-letter code. Parsing also accepts the full name.
/// Anything unrecognised lands in `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Knowledge,
    Personality,
    Ability,
    Competency,
    BehavioralSituational,
    #[default]
    Other,
}

impl Category {
    pub fn code(self) -> &'static str {
        match self {
            Category::Knowledge => "K",
            Category::Personality => "P",
            Category::Ability => "A",
            Category::Competency => "C",
            Category::BehavioralSituational => "B",
            Category::Other => "O",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "k" | "knowledge" => Category::Knowledge,
            "p" | "personality" => Category::Personality,
            "a" | "ability" => Category::Ability,
            "c" | "competency" => Category::Competency,
            "b" | "behavioral-situational" | "behavioral_situational" => {
                Category::BehavioralSituational
            }
            _ => Category::Other,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Yes/No flag as it appears in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportFlag {
    Yes,
    No,
}

impl SupportFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            SupportFlag::Yes => "Yes",
            SupportFlag::No => "No",
        }
    }

    /// `None` for anything that is not a recognisable yes/no.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Some(SupportFlag::Yes),
            "no" | "n" | "false" => Some(SupportFlag::No),
            _ => None,
        }
    }
}

impl Serialize for SupportFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One assessment from the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub name: String,
    /// External identity of the assessment.
    pub url: String,
    pub description: String,
    pub category: Category,
    /// Lower-cased, de-duplicated tags.
    pub skills: Vec<String>,
    pub adaptive_support: SupportFlag,
    pub remote_support: SupportFlag,
    /// Minutes. `None` when the source has no (positive) duration.
    pub duration: Option<u32>,
}

impl AssessmentRecord {
    /// The composite text that represents this record in embedding space.
    pub fn document_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.skills.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_codes_and_names() {
        assert_eq!(Category::parse("K"), Category::Knowledge);
        assert_eq!(Category::parse("personality"), Category::Personality);
        assert_eq!(Category::parse(" a "), Category::Ability);
        assert_eq!(Category::parse("C"), Category::Competency);
        assert_eq!(
            Category::parse("Behavioral-situational"),
            Category::BehavioralSituational
        );
        assert_eq!(Category::parse("O"), Category::Other);
    }

    #[test]
    fn test_unknown_category_code_is_other() {
        assert_eq!(Category::parse("S"), Category::Other);
        assert_eq!(Category::parse(""), Category::Other);
    }

    #[test]
    fn test_category_serializes_as_code() {
        let json = serde_json::to_string(&vec![Category::Knowledge, Category::Other]).unwrap();
        assert_eq!(json, r#"["K","O"]"#);
    }

    #[test]
    fn test_support_flag_parses_yes_no_any_case() {
        assert_eq!(SupportFlag::parse("Yes"), Some(SupportFlag::Yes));
        assert_eq!(SupportFlag::parse(" no "), Some(SupportFlag::No));
        assert_eq!(SupportFlag::parse("TRUE"), Some(SupportFlag::Yes));
    }

    #[test]
    fn test_support_flag_rejects_garbage() {
        assert_eq!(SupportFlag::parse("maybe"), None);
        assert_eq!(SupportFlag::parse("N/A"), None);
    }

    #[test]
    fn test_support_flag_serializes_as_text() {
        let json = serde_json::to_string(&vec![SupportFlag::Yes, SupportFlag::No]).unwrap();
        assert_eq!(json, r#"["Yes","No"]"#);
    }

    #[test]
    fn test_document_text_joins_name_description_skills() {
        let record = AssessmentRecord {
            name: "SQL Assessment".to_string(),
            url: "https://example.com/sql".to_string(),
            description: "Tests SQL queries".to_string(),
            category: Category::Knowledge,
            skills: vec!["sql".to_string(), "database".to_string()],
            adaptive_support: SupportFlag::No,
            remote_support: SupportFlag::Yes,
            duration: Some(35),
        };
        assert_eq!(
            record.document_text(),
            "SQL Assessment Tests SQL queries sql database"
        );
    }
}
