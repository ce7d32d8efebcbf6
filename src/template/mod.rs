//! Template Set Loader - discover and validate localized email template sets

pub mod metadata;
pub mod set;

pub use metadata::{METADATA_FILE, TemplateMetadata};
pub use set::{EmailTemplate, EmailTemplateSet, discover_template_sets};
