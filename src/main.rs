use clap::Parser;
use colored::*;
use dialoguer::Confirm;
use emlsync::locale::Locale;
use emlsync::postmark::PostmarkClient;
use emlsync::render::BlueprintRenderer;
use emlsync::sync::{EmailTemplateManager, ManagerOptions};
use emlsync::translations::{Catalog, TranslizedClient, pull_translations, push_terms};
use eyre::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::{Commands, TranslationCommands};
use config::{Config, Settings};

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emlsync")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("emlsync.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Push {
            limit_lang,
            limit_template_set,
            everything,
            yes,
        } => handle_push_command(*limit_lang, limit_template_set.as_deref(), *everything, *yes, config).await,
        Commands::Render => handle_render_command(config),
        Commands::Translations { command } => handle_translations_command(command, config).await,
    }
}

async fn handle_push_command(
    limit_lang: Option<Locale>,
    limit_template_set: Option<&str>,
    everything: bool,
    yes: bool,
    config: &Config,
) -> Result<()> {
    info!(
        "Push - lang: {:?}, template set: {:?}, everything: {}",
        limit_lang, limit_template_set, everything
    );

    if let Some(locale) = limit_lang
        && !config.locales.contains(&locale)
    {
        bail!(emlsync::EmlError::Usage(format!(
            "--limit-lang {} is not one of the configured locales",
            locale
        )));
    }

    if everything {
        confirm_upload(yes, || {
            Confirm::new()
                .with_prompt("Do you want to upload all email templates?")
                .default(false)
                .interact()
                .context("Failed to read confirmation")
        })?;
    } else if limit_lang.is_none() && limit_template_set.is_none() {
        log::warn!("No limit given, uploading every template set");
    }

    let settings = Settings::from_env()?;
    let api = PostmarkClient::new(settings.postmark_server_token()?, &config.postmark.client_config())?;

    let options = ManagerOptions {
        locales: config.locales.clone(),
        limit_locale: limit_lang,
        limit_template_set: limit_template_set.map(str::to_string),
        alias_scheme: config.sync.alias_scheme,
        page_size: config.postmark.page_size,
    };
    let mut manager = EmailTemplateManager::new(&config.paths.templates_dir, Arc::new(api), options)
        .context("Failed to load template sets")?;

    let report = manager.upload_templates().await.context("Failed to upload templates")?;
    println!(
        "{} {} created, {} updated",
        "Done:".green(),
        report.created(),
        report.updated()
    );
    Ok(())
}

/// Declining fails the run so the exit status tells it apart from a completed upload
fn confirm_upload(yes: bool, ask: impl FnOnce() -> Result<bool>) -> Result<()> {
    if yes || ask()? {
        return Ok(());
    }
    println!("{}", "Aborted!".red());
    bail!("Aborted: upload of all email templates was not confirmed")
}

fn handle_render_command(config: &Config) -> Result<()> {
    info!("Rendering blueprints from {}", config.paths.blueprints_dir.display());
    let renderer = BlueprintRenderer::new(
        &config.paths.blueprints_dir,
        &config.paths.translations_dir,
        &config.paths.templates_dir,
        &config.locales,
    );

    let written = renderer.render_all().context("Failed to render blueprints")?;
    println!("{} rendered {} files", "Done:".green(), written.len());
    Ok(())
}

async fn handle_translations_command(command: &TranslationCommands, config: &Config) -> Result<()> {
    info!("Handling translations command: {:?}", command);
    let settings = Settings::from_env()?;
    let client = TranslizedClient::new(
        settings.translized_api_key()?,
        settings.translized_project_id()?.clone(),
        &config.translized.client_config(),
    )?;

    match command {
        TranslationCommands::Pull => {
            pull_translations(&client, &config.paths.translations_dir, &config.locales)
                .await
                .context("Failed to pull translations")?;
            println!("done");
        }
        TranslationCommands::Push { pot } => {
            let pot = pot.as_ref().unwrap_or(&config.paths.pot_file);
            let catalog = Catalog::load(pot).with_context(|| format!("Failed to read {}", pot.display()))?;
            let results = push_terms(&client, &catalog).await.context("Failed to push terms")?;
            println!("{} {} terms sent", "Done:".green(), results.len());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
