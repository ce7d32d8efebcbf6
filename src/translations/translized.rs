//! Translized term-management API
//!
//! Pull: export each locale as a `.po` file, then download it.
//! Push: register every msgid of the template `.pot` as a term; terms the
//! project already knows come back as a 400 with code 141 and are reported
//! as duplicates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{EmlError, Result};
use crate::locale::Locale;
use crate::translations::po::Catalog;

/// Translized API base URL
pub const TRANSLIZED_API_URL: &str = "https://api.translized.com";

/// Application error code for a term that already exists
const DUPLICATE_TERM_CODE: i64 = 141;

/// Translized project identifier; settings files carry it as text or number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectId::Number(n) => write!(f, "{}", n),
            ProjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Outcome of adding one term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStatus {
    Created(u16),
    Duplicate,
}

impl std::fmt::Display for TermStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermStatus::Created(status) => write!(f, "{}", status),
            TermStatus::Duplicate => write!(f, "DUP"),
        }
    }
}

/// Remote translation operations
#[async_trait]
pub trait TermsApi: Send + Sync {
    /// Export the project's catalog for one locale and return the `.po` bytes
    async fn export_locale(&self, locale: Locale) -> Result<Vec<u8>>;

    /// Register a term with its source-reference context
    async fn add_term(&self, term_key: &str, context: &str) -> Result<TermStatus>;
}

/// Configuration for the Translized client
#[derive(Debug, Clone)]
pub struct TranslizedConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for TranslizedConfig {
    fn default() -> Self {
        Self {
            base_url: TRANSLIZED_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct TranslizedClient {
    client: Client,
    base_url: String,
    api_key: String,
    project_id: ProjectId,
}

impl TranslizedClient {
    pub fn new(api_key: impl Into<String>, project_id: ProjectId, config: &TranslizedConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            project_id,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn export_body(&self, locale: Locale) -> Value {
        json!({
            "projectId": self.project_id,
            "exportFormat": "po",
            "languageCode": locale.as_str(),
        })
    }

    fn term_body(&self, term_key: &str, context: &str) -> Value {
        json!({
            "projectId": self.project_id,
            "termKey": term_key,
            "context": context,
        })
    }
}

async fn api_error(response: reqwest::Response) -> EmlError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    EmlError::Api { status, message }
}

/// Whether a 400 body marks the term as already present
fn is_duplicate_term(body: &Value) -> bool {
    body.get("code").and_then(Value::as_i64) == Some(DUPLICATE_TERM_CODE)
}

/// Pull `result.fileURL` out of an export response
fn export_file_url(body: &Value) -> Result<String> {
    body.pointer("/result/fileURL")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| EmlError::Translation(format!("Export response has no result.fileURL: {}", body)))
}

#[async_trait]
impl TermsApi for TranslizedClient {
    async fn export_locale(&self, locale: Locale) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(self.endpoint("project/export"))
            .header("api-token", &self.api_key)
            .json(&self.export_body(locale))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: Value = response.json().await?;
        let file_url = export_file_url(&body)?;
        log::debug!("Export for {} available at {}", locale, file_url);

        let file = self.client.get(&file_url).send().await?;
        if !file.status().is_success() {
            return Err(api_error(file).await);
        }
        Ok(file.bytes().await?.to_vec())
    }

    async fn add_term(&self, term_key: &str, context: &str) -> Result<TermStatus> {
        let response = self
            .client
            .post(self.endpoint("term/add"))
            .header("api-token", &self.api_key)
            .json(&self.term_body(term_key, context))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let message = response.text().await.unwrap_or_default();
            let body: Value = serde_json::from_str(&message).unwrap_or(Value::Null);
            if is_duplicate_term(&body) {
                return Ok(TermStatus::Duplicate);
            }
            return Err(EmlError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }
        Ok(TermStatus::Created(status.as_u16()))
    }
}

impl std::fmt::Debug for TranslizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslizedClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Where a locale's downloaded catalog lives
pub fn catalog_path(translations_dir: &Path, locale: Locale) -> PathBuf {
    translations_dir
        .join(locale.as_str())
        .join("LC_MESSAGES")
        .join("messages.po")
}

/// Download every locale's catalog into `translations_dir`
pub async fn pull_translations(
    api: &dyn TermsApi,
    translations_dir: &Path,
    locales: &[Locale],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(locales.len());
    for &locale in locales {
        println!("Generating PO file for lang {}", locale);
        let content = api.export_locale(locale).await?;

        let path = catalog_path(translations_dir, locale);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &content)?;

        println!("Downloaded {} to {}", locale, path.display());
        log::info!("Wrote {} bytes of {} translations to {}", content.len(), locale, path.display());
        written.push(path);
    }
    Ok(written)
}

/// Register every term of `catalog`, in file order
pub async fn push_terms(api: &dyn TermsApi, catalog: &Catalog) -> Result<Vec<(String, TermStatus)>> {
    let mut results = Vec::with_capacity(catalog.len());
    for entry in catalog.entries() {
        let status = api.add_term(&entry.msgid, &entry.context()).await?;
        println!("{}: {}", status, entry.msgid);
        results.push((entry.msgid.clone(), status));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CannedServer;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockTerms {
        known: HashSet<String>,
        added: Mutex<Vec<(String, String)>>,
        exported: Mutex<Vec<Locale>>,
    }

    #[async_trait]
    impl TermsApi for MockTerms {
        async fn export_locale(&self, locale: Locale) -> Result<Vec<u8>> {
            self.exported.lock().unwrap().push(locale);
            Ok(format!("msgid \"Hello\"\nmsgstr \"Hello in {}\"\n", locale).into_bytes())
        }

        async fn add_term(&self, term_key: &str, context: &str) -> Result<TermStatus> {
            self.added
                .lock()
                .unwrap()
                .push((term_key.to_string(), context.to_string()));
            if self.known.contains(term_key) {
                Ok(TermStatus::Duplicate)
            } else {
                Ok(TermStatus::Created(200))
            }
        }
    }

    fn client() -> TranslizedClient {
        TranslizedClient::new("secret-key", ProjectId::Number(42), &TranslizedConfig::default()).unwrap()
    }

    #[test]
    fn test_project_id_untagged() {
        #[derive(Deserialize)]
        struct Holder {
            id: ProjectId,
        }
        let holder: Holder = toml::from_str("id = 42").unwrap();
        assert_eq!(holder.id, ProjectId::Number(42));
        let id: ProjectId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(id, ProjectId::Text("abc-123".to_string()));
        assert_eq!(serde_json::to_value(ProjectId::Number(7)).unwrap(), json!(7));
    }

    #[test]
    fn test_term_status_display() {
        assert_eq!(TermStatus::Created(200).to_string(), "200");
        assert_eq!(TermStatus::Duplicate.to_string(), "DUP");
    }

    #[test]
    fn test_request_bodies() {
        let client = client();
        assert_eq!(
            client.export_body(Locale::Fr),
            json!({"projectId": 42, "exportFormat": "po", "languageCode": "fr"})
        );
        assert_eq!(
            client.term_body("Hello", "a.html 1"),
            json!({"projectId": 42, "termKey": "Hello", "context": "a.html 1"})
        );
        assert_eq!(client.endpoint("term/add"), "https://api.translized.com/term/add");
    }

    #[test]
    fn test_duplicate_detection() {
        assert!(is_duplicate_term(&json!({"code": 141, "message": "Term exists"})));
        assert!(!is_duplicate_term(&json!({"code": 140})));
        assert!(!is_duplicate_term(&Value::Null));
    }

    #[test]
    fn test_export_file_url() {
        let body = json!({"result": {"fileURL": "https://cdn.example/fr.po"}});
        assert_eq!(export_file_url(&body).unwrap(), "https://cdn.example/fr.po");
        assert!(export_file_url(&json!({"result": {}})).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug_str = format!("{:?}", client());
        assert!(!debug_str.contains("secret-key"));
    }

    fn canned_client(server: &CannedServer) -> TranslizedClient {
        let config = TranslizedConfig {
            base_url: server.base_url.clone(),
            ..Default::default()
        };
        TranslizedClient::new("key", ProjectId::Number(42), &config).unwrap()
    }

    #[tokio::test]
    async fn test_add_term_duplicate_code() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let handle = server.serve(vec![(400, r#"{"code":141,"message":"Term already exists"}"#.to_string())]);

        let status = client.add_term("Hello", "a.html.j2 3").await.unwrap();
        let requests = handle.await.unwrap();

        assert_eq!(status, TermStatus::Duplicate);
        let request = requests[0].to_lowercase();
        assert!(request.starts_with("post /term/add http/1.1"));
        assert!(request.contains("api-token: key"));
        assert!(requests[0].contains(r#""termKey":"Hello""#));
    }

    #[tokio::test]
    async fn test_add_term_other_bad_request_fails() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let handle = server.serve(vec![(400, r#"{"code":140,"message":"Invalid project"}"#.to_string())]);

        let result = client.add_term("Hello", "").await;
        handle.await.unwrap();

        match result {
            Err(EmlError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("Invalid project"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_term_created() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let handle = server.serve(vec![(200, r#"{"result":{}}"#.to_string())]);

        let status = client.add_term("Hello", "").await.unwrap();
        handle.await.unwrap();

        assert_eq!(status, TermStatus::Created(200));
    }

    #[tokio::test]
    async fn test_add_term_server_error_fails() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let handle = server.serve(vec![(503, "{}".to_string())]);

        let result = client.add_term("Hello", "").await;
        handle.await.unwrap();

        assert!(matches!(result, Err(EmlError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_export_then_download() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let file_url = format!("{}/files/fr.po", server.base_url);
        let handle = server.serve(vec![
            (200, json!({"result": {"fileURL": file_url}}).to_string()),
            (200, "msgid \"Hello\"\nmsgstr \"Bonjour\"\n".to_string()),
        ]);

        let content = client.export_locale(Locale::Fr).await.unwrap();
        let requests = handle.await.unwrap();

        assert_eq!(content, b"msgid \"Hello\"\nmsgstr \"Bonjour\"\n".to_vec());
        assert!(requests[0].starts_with("POST /project/export HTTP/1.1"));
        assert!(requests[0].contains(r#""languageCode":"fr""#));
        assert!(requests[1].starts_with("GET /files/fr.po HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_export_error_status_fails() {
        let server = CannedServer::bind().await;
        let client = canned_client(&server);
        let handle = server.serve(vec![(401, r#"{"message":"Invalid token"}"#.to_string())]);

        let result = client.export_locale(Locale::De).await;
        let requests = handle.await.unwrap();

        assert!(matches!(result, Err(EmlError::Api { status: 401, .. })));
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_pull_writes_catalogs() {
        let temp_dir = TempDir::new().unwrap();
        let api = MockTerms::default();

        let paths = pull_translations(&api, temp_dir.path(), &Locale::ALL).await.unwrap();

        assert_eq!(paths.len(), 4);
        assert_eq!(*api.exported.lock().unwrap(), Locale::ALL.to_vec());
        let fr = catalog_path(temp_dir.path(), Locale::Fr);
        assert!(fr.ends_with("fr/LC_MESSAGES/messages.po"));
        let catalog = Catalog::load(&fr).unwrap();
        assert_eq!(catalog.gettext("Hello"), Some("Hello in fr"));
    }

    #[tokio::test]
    async fn test_push_terms_reports_duplicates() {
        let catalog = Catalog::parse(
            "msgid \"\"\nmsgstr \"\"\n\n#: a.html.j2:3\nmsgid \"Hello\"\nmsgstr \"\"\n\n#: b.html.j2:7\nmsgid \"Bye\"\nmsgstr \"\"\n",
        )
        .unwrap();
        let api = MockTerms {
            known: HashSet::from(["Bye".to_string()]),
            ..Default::default()
        };

        let results = push_terms(&api, &catalog).await.unwrap();

        assert_eq!(
            results,
            vec![
                ("Hello".to_string(), TermStatus::Created(200)),
                ("Bye".to_string(), TermStatus::Duplicate),
            ]
        );
        let added = api.added.lock().unwrap();
        assert_eq!(added[0], ("Hello".to_string(), "a.html.j2 3".to_string()));
    }
}
