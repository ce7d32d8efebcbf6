//! emlsync - build and deploy multilingual email templates
//!
//! Renders localized HTML from blueprints, validates each template set's
//! metadata and upserts every (template set, locale) pair to Postmark by
//! alias. A side pipeline exchanges translation catalogs with Translized.

pub mod error;
pub mod locale;
pub mod postmark;
pub mod render;
pub mod sync;
pub mod template;
pub mod translations;

#[cfg(test)]
mod testing;

pub use error::{EmlError, Result};
