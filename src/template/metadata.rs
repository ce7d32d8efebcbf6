//! Template set metadata - `metadata.json` parsing and validation
//!
//! Each template set directory carries a `metadata.json` of the form
//! `{"alias": "...", "subject": {"en": "...", ...}}`. Validation stops at the
//! first violation.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{EmlError, Result};
use crate::locale::Locale;

/// File name of the metadata inside a template set directory
pub const METADATA_FILE: &str = "metadata.json";

const MIN_ALIAS_CHARS: usize = 4;
const MIN_SUBJECT_CHARS: usize = 6;

/// Validated metadata for one template set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    pub alias: String,
    pub subjects: BTreeMap<Locale, String>,
}

impl TemplateMetadata {
    /// Read and validate `metadata.json` from a template set directory
    pub fn load(template_set_dir: &Path, locales: &[Locale]) -> Result<Self> {
        let path = template_set_dir.join(METADATA_FILE);
        if !path.is_file() {
            return Err(EmlError::invalid_metadata(&path, "Missing metadata file"));
        }

        log::info!("Reading metadata from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, locales).map_err(|reason| EmlError::invalid_metadata(&path, reason))
    }

    /// Parse metadata from a JSON string, returning the first violation as text
    pub fn parse(content: &str, locales: &[Locale]) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| format!("Malformed JSON: {}", e))?;
        let object = value
            .as_object()
            .ok_or_else(|| "Metadata must be a JSON object".to_string())?;

        let alias = object
            .get("alias")
            .ok_or_else(|| "Missing alias key in metadata".to_string())?;
        let alias = validate_alias(alias)?;

        let subjects = object
            .get("subject")
            .ok_or_else(|| "Missing subject key in metadata".to_string())?;
        let subjects = validate_subjects(subjects, locales)?;

        Ok(Self {
            alias: alias.to_string(),
            subjects,
        })
    }

    /// Subject line for a locale
    pub fn subject(&self, locale: Locale) -> Option<&str> {
        self.subjects.get(&locale).map(String::as_str)
    }
}

fn validate_alias(alias: &Value) -> std::result::Result<&str, String> {
    let alias = alias.as_str().ok_or_else(|| "Alias must be a string".to_string())?;
    if alias.chars().count() < MIN_ALIAS_CHARS {
        return Err(format!("Alias must be at least {} characters", MIN_ALIAS_CHARS));
    }
    if alias.chars().any(char::is_whitespace) {
        return Err("Alias must not contain whitespace".to_string());
    }
    Ok(alias)
}

fn validate_subjects(subjects: &Value, locales: &[Locale]) -> std::result::Result<BTreeMap<Locale, String>, String> {
    let subjects = subjects
        .as_object()
        .ok_or_else(|| format!("Subjects must be a mapping of locale to subject, got {}", subjects))?;

    let missing: Vec<&str> = locales
        .iter()
        .map(Locale::as_str)
        .filter(|code| !subjects.contains_key(*code))
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing email subjects for locales: {}", missing.join(", ")));
    }

    // Unsupported extra entries are checked too, then dropped.
    let mut validated = BTreeMap::new();
    for (code, subject) in subjects {
        let subject = subject
            .as_str()
            .ok_or_else(|| format!("Subject ({}) must be a string, got {}", code, subject))?;
        if subject.chars().count() < MIN_SUBJECT_CHARS {
            return Err(format!(
                "Subject ({}) must be at least {} characters, not '{}'",
                code, MIN_SUBJECT_CHARS, subject
            ));
        }
        if let Ok(locale) = code.parse::<Locale>()
            && locales.contains(&locale)
        {
            validated.insert(locale, subject.to_string());
        }
    }

    Ok(validated)
}
