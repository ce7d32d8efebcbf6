//! Blueprint rendering - one HTML file per blueprint and locale
//!
//! Blueprints are minijinja templates calling `_("...")` (or `gettext`) for
//! translatable strings. Each locale's catalog is handed to its own
//! environment, so no translation state outlives a single render.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment, context};

use crate::error::{EmlError, Result};
use crate::locale::Locale;
use crate::translations::{Catalog, catalog_path};

/// Prefix marking strings that have no translation in the active catalog
pub const MISSING_TRANSLATION_PREFIX: &str = "XXX_MISSING_TRANS_XXX";

/// File suffixes recognised as blueprints
pub const BLUEPRINT_EXTENSIONS: [&str; 3] = [".html.j2", ".hbs.j2", ".html"];

/// Renders blueprints into per-locale template set directories
#[derive(Debug, Clone)]
pub struct BlueprintRenderer {
    blueprints_dir: PathBuf,
    translations_dir: PathBuf,
    output_dir: PathBuf,
    locales: Vec<Locale>,
}

impl BlueprintRenderer {
    pub fn new(
        blueprints_dir: impl Into<PathBuf>,
        translations_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        locales: &[Locale],
    ) -> Self {
        Self {
            blueprints_dir: blueprints_dir.into(),
            translations_dir: translations_dir.into(),
            output_dir: output_dir.into(),
            locales: locales.to_vec(),
        }
    }

    /// Blueprint file names in the blueprints directory, sorted
    pub fn list_blueprints(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.blueprints_dir).map_err(|e| {
            EmlError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to read blueprints directory {}: {}",
                    self.blueprints_dir.display(),
                    e
                ),
            ))
        })?;

        let mut names: Vec<String> = entries
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| is_blueprint(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Render every blueprint for every locale, returning the written files
    pub fn render_all(&self) -> Result<Vec<PathBuf>> {
        let blueprints = self.list_blueprints()?;
        let mut written = Vec::with_capacity(blueprints.len() * self.locales.len());

        for &locale in &self.locales {
            let catalog = Catalog::load_or_empty(&catalog_path(&self.translations_dir, locale))?;
            let env = self.environment(&catalog);

            for blueprint in &blueprints {
                let html = render_with(&env, blueprint, locale)?;
                let path = self.output_path(blueprint, locale);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, html)?;
                log::info!("Rendered {} ({}) to {}", blueprint, locale, path.display());
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Render a single blueprint with an explicit catalog
    pub fn render_blueprint(&self, blueprint: &str, locale: Locale, catalog: &Catalog) -> Result<String> {
        render_with(&self.environment(catalog), blueprint, locale)
    }

    /// `{output_dir}/{base}/{base}_{locale}.html`
    pub fn output_path(&self, blueprint: &str, locale: Locale) -> PathBuf {
        let base = blueprint_base_name(blueprint);
        self.output_dir.join(base).join(format!("{}_{}.html", base, locale))
    }

    fn environment(&self, catalog: &Catalog) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(self.blueprints_dir.clone()));
        env.set_auto_escape_callback(|_| AutoEscape::None);

        let translations = Arc::new(catalog.translations());
        let lookup = translations.clone();
        env.add_function("_", move |message: String| translate(&lookup, &message));
        env.add_function("gettext", move |message: String| translate(&translations, &message));
        env
    }
}

fn render_with(env: &Environment<'static>, blueprint: &str, locale: Locale) -> Result<String> {
    let template = env
        .get_template(blueprint)
        .map_err(|e| EmlError::Render(format!("{}: {}", blueprint, e)))?;
    template
        .render(context! { locale => locale.as_str() })
        .map_err(|e| EmlError::Render(format!("{} ({}): {}", blueprint, locale, e)))
}

/// A translation identical to its msgid counts as missing
fn translate(translations: &HashMap<String, String>, message: &str) -> String {
    match translations.get(message) {
        Some(translated) if translated != message => translated.clone(),
        _ => format!("{}: {}", MISSING_TRANSLATION_PREFIX, message),
    }
}

fn is_blueprint(name: &str) -> bool {
    BLUEPRINT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// File name up to its first `.`
fn blueprint_base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}
