//! Translation side-pipeline - gettext catalogs and the Translized API

pub mod po;
pub mod translized;

pub use po::{Catalog, PoEntry};
pub use translized::{
    ProjectId, TRANSLIZED_API_URL, TermStatus, TermsApi, TranslizedClient, TranslizedConfig, catalog_path,
    pull_translations, push_terms,
};
