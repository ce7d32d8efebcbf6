//! Template synchronization - create-or-update of localized templates

pub mod manager;

pub use manager::{AliasScheme, EmailTemplateManager, ManagerOptions, SyncReport, UpsertAction, UpsertRecord};
