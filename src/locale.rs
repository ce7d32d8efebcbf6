//! Supported locales.
//!
//! Every template set carries one subject and one rendered body per locale.

use serde::{Deserialize, Serialize};

use crate::error::EmlError;

/// A supported language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Fr,
    It,
    De,
}

impl Locale {
    /// All locales in declared order.
    pub const ALL: [Locale; 4] = [Locale::En, Locale::Fr, Locale::It, Locale::De];

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::It => "it",
            Locale::De => "de",
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Locale {
    type Err = EmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "fr" => Ok(Locale::Fr),
            "it" => Ok(Locale::It),
            "de" => Ok(Locale::De),
            other => Err(EmlError::Usage(format!(
                "Unsupported locale '{}', expected one of: {}",
                other,
                Locale::ALL.map(|l| l.as_str()).join(", ")
            ))),
        }
    }
}
