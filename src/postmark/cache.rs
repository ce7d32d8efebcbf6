//! Remote Template Cache - snapshot of the provider's template listing
//!
//! The snapshot is fetched on first use and reused afterwards. A lookup that
//! misses on a reused snapshot refreshes it once and searches again; a miss on
//! a freshly fetched snapshot is final.

use crate::error::{EmlError, Result};
use crate::postmark::client::TemplateApi;
use crate::postmark::types::RemoteTemplate;

/// Extra refreshes allowed per lookup after a stale miss
const MAX_REFRESHES_PER_LOOKUP: u32 = 1;

/// How a remote template is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateKey {
    ByAlias(String),
    ById(u64),
}

impl TemplateKey {
    pub fn alias(alias: impl Into<String>) -> Self {
        TemplateKey::ByAlias(alias.into())
    }

    /// Exact, case-sensitive match
    pub fn matches(&self, template: &RemoteTemplate) -> bool {
        match self {
            TemplateKey::ByAlias(alias) => template.alias.as_deref() == Some(alias.as_str()),
            TemplateKey::ById(id) => template.template_id == *id,
        }
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKey::ByAlias(alias) => write!(f, "Alias = {}", alias),
            TemplateKey::ById(id) => write!(f, "TemplateId = {}", id),
        }
    }
}

/// Local snapshot of all remote templates
#[derive(Debug, Clone)]
pub struct TemplateCache {
    templates: Option<Vec<RemoteTemplate>>,
    page_size: u32,
    fetches: usize,
}

impl TemplateCache {
    pub fn new(page_size: u32) -> Self {
        Self {
            templates: None,
            page_size,
            fetches: 0,
        }
    }

    /// Whether a snapshot has been fetched
    pub fn is_loaded(&self) -> bool {
        self.templates.is_some()
    }

    /// Number of listing calls made so far
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    pub fn snapshot(&self) -> Option<&[RemoteTemplate]> {
        self.templates.as_deref()
    }

    /// Search the current snapshot without touching the network
    pub fn find(&self, key: &TemplateKey) -> Option<&RemoteTemplate> {
        self.templates.as_ref()?.iter().find(|t| key.matches(t))
    }

    /// Replace the snapshot with a fresh listing.
    ///
    /// Listing is a single page; a remote total at or above the page size is
    /// an error rather than a silently truncated snapshot.
    pub async fn refresh(&mut self, api: &dyn TemplateApi) -> Result<()> {
        let listing = api.list_templates(0, self.page_size).await?;
        self.fetches += 1;

        if listing.total_count >= u64::from(self.page_size) {
            return Err(EmlError::PageLimit {
                total: listing.total_count,
                limit: self.page_size,
            });
        }

        log::debug!(
            "Fetched {} remote templates (fetch #{})",
            listing.templates.len(),
            self.fetches
        );
        self.templates = Some(listing.templates);
        Ok(())
    }

    /// Find a template, refreshing a stale snapshot at most once
    pub async fn lookup(&mut self, api: &dyn TemplateApi, key: &TemplateKey) -> Result<RemoteTemplate> {
        let mut fresh = false;
        if !self.is_loaded() {
            self.refresh(api).await?;
            fresh = true;
        }

        let mut refreshes = 0;
        loop {
            if let Some(template) = self.find(key) {
                return Ok(template.clone());
            }
            if fresh || refreshes >= MAX_REFRESHES_PER_LOOKUP {
                return Err(EmlError::NotFound { key: key.to_string() });
            }

            log::debug!("{} missing from cached listing, refreshing", key);
            self.refresh(api).await?;
            refreshes += 1;
            fresh = true;
        }
    }

    pub async fn by_alias(&mut self, api: &dyn TemplateApi, alias: &str) -> Result<RemoteTemplate> {
        self.lookup(api, &TemplateKey::alias(alias)).await
    }

    pub async fn by_id(&mut self, api: &dyn TemplateApi, template_id: u64) -> Result<RemoteTemplate> {
        self.lookup(api, &TemplateKey::ById(template_id)).await
    }
}
