//! Template Sync Manager - upsert every localized template to the provider
//!
//! Each localized template goes through one pass:
//! discovered -> alias lookup -> create or update -> done.
//! Nothing is retried; the first transport or API failure aborts the run and
//! templates already upserted stay upserted.

use std::path::Path;
use std::sync::Arc;

use colored::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::locale::Locale;
use crate::postmark::cache::TemplateCache;
use crate::postmark::client::{DEFAULT_PAGE_SIZE, TemplateApi};
use crate::postmark::types::{TemplatePayload, prettify_payload};
use crate::template::{EmailTemplate, EmailTemplateSet, discover_template_sets};

/// How a template set's alias maps onto remote templates per locale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasScheme {
    /// Every locale is sent under the metadata alias unchanged; the remote
    /// template ends up holding whichever locale was upserted last.
    #[default]
    Shared,
    /// Each locale gets its own remote template, `{alias}-{locale}`.
    PerLocale,
}

impl AliasScheme {
    pub fn remote_alias(&self, alias: &str, locale: Locale) -> String {
        match self {
            AliasScheme::Shared => alias.to_string(),
            AliasScheme::PerLocale => format!("{}-{}", alias, locale),
        }
    }
}

/// Which call an upsert ended up making
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

/// One completed upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRecord {
    pub alias: String,
    pub name: String,
    pub locale: Locale,
    pub action: UpsertAction,
}

/// Outcome of `upload_templates`, in upload order
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub records: Vec<UpsertRecord>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.count(UpsertAction::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(UpsertAction::Updated)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn count(&self, action: UpsertAction) -> usize {
        self.records.iter().filter(|r| r.action == action).count()
    }
}

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub locales: Vec<Locale>,
    pub limit_locale: Option<Locale>,
    pub limit_template_set: Option<String>,
    pub alias_scheme: AliasScheme,
    pub page_size: u32,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            locales: Locale::ALL.to_vec(),
            limit_locale: None,
            limit_template_set: None,
            alias_scheme: AliasScheme::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pushes discovered template sets to the provider
pub struct EmailTemplateManager {
    api: Arc<dyn TemplateApi>,
    cache: TemplateCache,
    template_sets: Vec<EmailTemplateSet>,
    limit_locale: Option<Locale>,
    alias_scheme: AliasScheme,
}

impl EmailTemplateManager {
    /// Discover template sets under `base_dir`; fails on the first invalid set
    pub fn new(base_dir: impl AsRef<Path>, api: Arc<dyn TemplateApi>, options: ManagerOptions) -> Result<Self> {
        let template_sets = discover_template_sets(
            base_dir.as_ref(),
            &options.locales,
            options.limit_template_set.as_deref(),
        )?;

        let names: Vec<&str> = template_sets.iter().map(|s| s.base_name()).collect();
        log::info!("Initialised template manager with template sets {:?}", names);

        Ok(Self {
            api,
            cache: TemplateCache::new(options.page_size),
            template_sets,
            limit_locale: options.limit_locale,
            alias_scheme: options.alias_scheme,
        })
    }

    pub fn template_sets(&self) -> &[EmailTemplateSet] {
        &self.template_sets
    }

    /// Upsert every template of every set, skipping locales outside the filter
    pub async fn upload_templates(&mut self) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for template_set in &self.template_sets {
            println!("Uploading template set for {}", template_set.base_name().blue());
            log::info!("Uploading template set {}", template_set.base_name());

            for template in template_set.get_all_templates() {
                if self.limit_locale.is_some_and(|limit| limit != template.locale()) {
                    continue;
                }

                let payload = build_payload(&template, self.alias_scheme)?;
                let (action, _) = upsert(&mut self.cache, self.api.as_ref(), &payload).await?;
                report.records.push(UpsertRecord {
                    alias: payload.alias,
                    name: payload.name,
                    locale: template.locale(),
                    action,
                });
            }
        }

        log::info!(
            "Sync finished: {} created, {} updated",
            report.created(),
            report.updated()
        );
        Ok(report)
    }

    /// Create the template if its alias is unknown remotely, else replace it
    pub async fn upsert_template(&mut self, payload: &TemplatePayload) -> Result<(UpsertAction, Value)> {
        upsert(&mut self.cache, self.api.as_ref(), payload).await
    }
}

fn build_payload(template: &EmailTemplate<'_>, scheme: AliasScheme) -> Result<TemplatePayload> {
    let alias = scheme.remote_alias(template.alias(), template.locale());
    let payload = TemplatePayload::new(alias, template.name(), template.subject(), template.content()?)
        .with_text_body(template.text_content()?);
    Ok(payload)
}

async fn upsert(
    cache: &mut TemplateCache,
    api: &dyn TemplateApi,
    payload: &TemplatePayload,
) -> Result<(UpsertAction, Value)> {
    println!("Sending template {} to postmark", payload.name.blue());

    let exists = match cache.by_alias(api, &payload.alias).await {
        Ok(_) => true,
        Err(e) if e.is_not_found() => false,
        Err(e) => return Err(e),
    };

    let pretty = serde_json::to_string_pretty(&prettify_payload(payload))?;
    if exists {
        println!("{}\n {}", "Updating template:".yellow(), pretty);
        log::info!("Updating template {}: {}", payload.alias, pretty);
        let response = api.update_template(&payload.alias, payload).await?;
        Ok((UpsertAction::Updated, response))
    } else {
        println!("{}\n {}", "Creating template:".green(), pretty);
        log::info!("Creating template {}: {}", payload.alias, pretty);
        let response = api.create_template(payload).await?;
        Ok((UpsertAction::Created, response))
    }
}
