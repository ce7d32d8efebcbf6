//! Postmark template API wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body fields replaced by their length when logging a payload
const LARGE_FIELDS: [&str; 2] = ["HtmlBody", "TextBody"];

/// A template as listed by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteTemplate {
    /// Postmark allows templates without an alias
    #[serde(default)]
    pub alias: Option<String>,

    pub template_id: u64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub active: bool,
}

/// One page of `GET /templates`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateListing {
    pub total_count: u64,
    #[serde(default)]
    pub templates: Vec<RemoteTemplate>,
}

/// Body of both the create and the update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplatePayload {
    pub name: String,
    pub subject: String,
    pub alias: String,
    pub html_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
}

impl TemplatePayload {
    pub fn new(
        alias: impl Into<String>,
        name: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            alias: alias.into(),
            html_body: html_body.into(),
            text_body: None,
        }
    }

    pub fn with_text_body(mut self, text_body: Option<String>) -> Self {
        self.text_body = text_body.filter(|t| !t.is_empty());
        self
    }
}

/// JSON view of a payload with large body fields replaced by their length
pub fn prettify_payload(payload: &TemplatePayload) -> Value {
    let mut value = serde_json::to_value(payload).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut() {
        for key in LARGE_FIELDS {
            let marker = match object.get(key) {
                Some(Value::String(body)) => format!("Content with length: {}", body.chars().count()),
                _ => continue,
            };
            object.insert(key.to_string(), Value::String(marker));
        }
    }
    value
}
