//! Postmark integration - template API client, wire types and listing cache

pub mod cache;
pub mod client;
pub mod types;

pub use cache::{TemplateCache, TemplateKey};
pub use client::{DEFAULT_PAGE_SIZE, POSTMARK_API_URL, PostmarkClient, PostmarkConfig, TemplateApi};
pub use types::{RemoteTemplate, TemplateListing, TemplatePayload, prettify_payload};
