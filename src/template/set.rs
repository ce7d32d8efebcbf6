//! Template sets - one directory per logical email
//!
//! A template set directory holds `metadata.json` plus one rendered body per
//! locale named `{base_name}_{locale}.html` (and optionally `.txt`).

use std::path::{Path, PathBuf};

use crate::error::{EmlError, Result};
use crate::locale::Locale;
use crate::template::metadata::TemplateMetadata;

/// One validated template set
#[derive(Debug, Clone)]
pub struct EmailTemplateSet {
    location_dir: PathBuf,
    base_name: String,
    metadata: TemplateMetadata,
    locales: Vec<Locale>,
}

impl EmailTemplateSet {
    /// Load a template set, validating its metadata against `locales`
    pub fn load(location_dir: impl AsRef<Path>, locales: &[Locale]) -> Result<Self> {
        let location_dir = location_dir.as_ref().to_path_buf();
        if !location_dir.is_dir() {
            return Err(EmlError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", location_dir.display()),
            )));
        }

        let base_name = base_name_from_dir(&location_dir)?;
        let metadata = TemplateMetadata::load(&location_dir, locales)?;

        Ok(Self {
            location_dir,
            base_name,
            metadata,
            locales: locales.to_vec(),
        })
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn location_dir(&self) -> &Path {
        &self.location_dir
    }

    pub fn metadata(&self) -> &TemplateMetadata {
        &self.metadata
    }

    /// One template per supported locale, in declared order.
    ///
    /// Each call starts a fresh iteration.
    pub fn get_all_templates(&self) -> impl Iterator<Item = EmailTemplate<'_>> + '_ {
        self.locales.iter().map(move |&locale| EmailTemplate { set: self, locale })
    }

    /// The template for a single locale, if supported
    pub fn template(&self, locale: Locale) -> Option<EmailTemplate<'_>> {
        self.locales
            .contains(&locale)
            .then_some(EmailTemplate { set: self, locale })
    }
}

/// A template set viewed through one locale
#[derive(Debug, Clone, Copy)]
pub struct EmailTemplate<'a> {
    set: &'a EmailTemplateSet,
    locale: Locale,
}

impl<'a> EmailTemplate<'a> {
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Alias shared by every locale of the set
    pub fn alias(&self) -> &'a str {
        &self.set.metadata.alias
    }

    /// Human readable name, e.g. `Password_Reset_fr`
    pub fn name(&self) -> String {
        format!("{}_{}", title_case(&self.set.base_name), self.locale)
    }

    pub fn subject(&self) -> &'a str {
        // Metadata validation guarantees every supported locale has a subject.
        self.set.metadata.subject(self.locale).unwrap_or_default()
    }

    pub fn html_path(&self) -> PathBuf {
        self.body_path("html")
    }

    pub fn text_path(&self) -> PathBuf {
        self.body_path("txt")
    }

    /// Read the rendered HTML body from disk
    pub fn content(&self) -> Result<String> {
        let path = self.html_path();
        std::fs::read_to_string(&path).map_err(|e| {
            EmlError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read template {}: {}", path.display(), e),
            ))
        })
    }

    /// Read the plain text body, if one was rendered
    pub fn text_content(&self) -> Result<Option<String>> {
        let path = self.text_path();
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn body_path(&self, extension: &str) -> PathBuf {
        self.set
            .location_dir
            .join(format!("{}_{}.{}", self.set.base_name, self.locale, extension))
    }
}

/// Discover template sets under `base_dir`, sorted by directory name.
///
/// `limit_template_set` is applied to directory names before any metadata is
/// read. The first invalid set aborts discovery.
pub fn discover_template_sets(
    base_dir: &Path,
    locales: &[Locale],
    limit_template_set: Option<&str>,
) -> Result<Vec<EmailTemplateSet>> {
    let entries = std::fs::read_dir(base_dir).map_err(|e| {
        EmlError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read templates directory {}: {}", base_dir.display(), e),
        ))
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    if let Some(limit) = limit_template_set {
        dirs.retain(|dir| dir.file_name().is_some_and(|name| name == limit));
    }

    log::debug!("Template set directories: {:?}", dirs);
    dirs.iter().map(|dir| EmailTemplateSet::load(dir, locales)).collect()
}

fn base_name_from_dir(dir: &Path) -> Result<String> {
    dir.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| EmlError::invalid_metadata(dir, "Template set directory has no usable name"))
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
