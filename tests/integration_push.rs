//! End-to-end push tests
//!
//! Drives discovery, validation and upsert through the public API against an
//! in-memory provider.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use emlsync::error::{EmlError, Result};
use emlsync::locale::Locale;
use emlsync::postmark::{RemoteTemplate, TemplateApi, TemplateCache, TemplateListing, TemplatePayload};
use emlsync::sync::{EmailTemplateManager, ManagerOptions, UpsertAction};
use serde_json::{Value, json};
use tempfile::TempDir;

#[derive(Debug, Clone)]
enum Upsert {
    Create(TemplatePayload),
    Update(String, TemplatePayload),
}

impl Upsert {
    fn payload(&self) -> &TemplatePayload {
        match self {
            Upsert::Create(p) | Upsert::Update(_, p) => p,
        }
    }
}

#[derive(Default)]
struct FakePostmark {
    templates: Mutex<Vec<RemoteTemplate>>,
    upserts: Mutex<Vec<Upsert>>,
    listings: Mutex<usize>,
}

#[async_trait]
impl TemplateApi for FakePostmark {
    async fn list_templates(&self, _offset: u32, _count: u32) -> Result<TemplateListing> {
        *self.listings.lock().unwrap() += 1;
        let templates = self.templates.lock().unwrap().clone();
        Ok(TemplateListing {
            total_count: templates.len() as u64,
            templates,
        })
    }

    async fn create_template(&self, payload: &TemplatePayload) -> Result<Value> {
        self.upserts.lock().unwrap().push(Upsert::Create(payload.clone()));
        let mut templates = self.templates.lock().unwrap();
        let template_id = 1000 + templates.len() as u64;
        templates.push(RemoteTemplate {
            alias: Some(payload.alias.clone()),
            template_id,
            name: payload.name.clone(),
            active: true,
        });
        Ok(json!({"TemplateId": template_id}))
    }

    async fn update_template(&self, alias: &str, payload: &TemplatePayload) -> Result<Value> {
        self.upserts
            .lock()
            .unwrap()
            .push(Upsert::Update(alias.to_string(), payload.clone()));
        Ok(json!({"Alias": alias}))
    }
}

const WELCOME_METADATA: &str = r#"{
    "alias": "welcome-email",
    "subject": {
        "en": "Welcome aboard!",
        "fr": "Bienvenue à bord!",
        "it": "Benvenuto a bordo!",
        "de": "Willkommen an Bord!"
    }
}"#;

fn write_welcome(root: &Path) {
    let dir = root.join("welcome");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("metadata.json"), WELCOME_METADATA).unwrap();
    for locale in Locale::ALL {
        fs::write(
            dir.join(format!("welcome_{}.html", locale)),
            format!("<html lang=\"{}\">welcome</html>", locale),
        )
        .unwrap();
    }
}

/// Integration test: one template set, four locales, one shared alias
#[tokio::test]
async fn test_welcome_set_yields_four_upserts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_welcome(temp_dir.path());
    let api = Arc::new(FakePostmark::default());

    let mut manager = EmailTemplateManager::new(temp_dir.path(), api.clone(), ManagerOptions::default())?;
    let report = manager.upload_templates().await?;

    let upserts = api.upserts.lock().unwrap().clone();
    assert_eq!(upserts.len(), 4);
    assert_eq!(report.len(), 4);

    let expected_subjects = ["Welcome aboard!", "Bienvenue à bord!", "Benvenuto a bordo!", "Willkommen an Bord!"];
    for ((upsert, locale), subject) in upserts.iter().zip(Locale::ALL).zip(expected_subjects) {
        let payload = upsert.payload();
        assert_eq!(payload.alias, "welcome-email");
        assert_eq!(payload.subject, subject);
        assert_eq!(payload.name, format!("Welcome_{}", locale));
        assert_eq!(payload.html_body, format!("<html lang=\"{}\">welcome</html>", locale));
    }

    // First locale creates; fr refreshes once and sees it, it/de reuse that snapshot
    assert!(matches!(upserts[0], Upsert::Create(_)));
    assert!(upserts[1..].iter().all(|u| matches!(u, Upsert::Update(alias, _) if alias == "welcome-email")));
    assert_eq!(*api.listings.lock().unwrap(), 2);
    assert_eq!(report.records[0].action, UpsertAction::Created);
    Ok(())
}

/// Integration test: rerunning a completed sync only updates
#[tokio::test]
async fn test_rerun_is_update_only() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_welcome(temp_dir.path());
    let api = Arc::new(FakePostmark::default());

    EmailTemplateManager::new(temp_dir.path(), api.clone(), ManagerOptions::default())?
        .upload_templates()
        .await?;
    let report = EmailTemplateManager::new(temp_dir.path(), api.clone(), ManagerOptions::default())?
        .upload_templates()
        .await?;

    assert_eq!(report.created(), 0);
    assert_eq!(report.updated(), 4);
    assert_eq!(api.templates.lock().unwrap().len(), 1);
    Ok(())
}

/// Integration test: a broken metadata file stops the run before any call
#[tokio::test]
async fn test_invalid_metadata_blocks_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_welcome(temp_dir.path());
    let broken = temp_dir.path().join("alerts");
    fs::create_dir_all(&broken)?;
    fs::write(
        broken.join("metadata.json"),
        r#"{"alias": "alert", "subject": {"en": "Alert!!", "fr": "Alerte!"}}"#,
    )?;
    let api = Arc::new(FakePostmark::default());

    let result = EmailTemplateManager::new(temp_dir.path(), api.clone(), ManagerOptions::default());

    match result {
        Err(EmlError::InvalidMetadata { reason, .. }) => {
            assert_eq!(reason, "Missing email subjects for locales: it, de");
        }
        Err(other) => panic!("Expected InvalidMetadata, got {:?}", other),
        Ok(_) => panic!("Expected InvalidMetadata, got a manager"),
    }
    assert_eq!(*api.listings.lock().unwrap(), 0);
    Ok(())
}

/// Integration test: cache picks up a template created elsewhere after one refetch
#[tokio::test]
async fn test_cache_sees_remote_changes_after_single_refetch() -> Result<()> {
    let api = FakePostmark::default();
    let mut cache = TemplateCache::new(50);

    assert!(cache.by_alias(&api, "late-email").await.unwrap_err().is_not_found());
    assert_eq!(*api.listings.lock().unwrap(), 1);

    api.create_template(&TemplatePayload::new("late-email", "Late_en", "Arrived late", "<p/>"))
        .await?;

    let found = cache.by_alias(&api, "late-email").await?;
    assert_eq!(found.template_id, 1000);
    assert_eq!(*api.listings.lock().unwrap(), 2);

    cache.by_alias(&api, "late-email").await?;
    assert_eq!(*api.listings.lock().unwrap(), 2);
    Ok(())
}
