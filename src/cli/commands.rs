//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - push: upload rendered templates to Postmark
//! - render: render blueprints for every locale
//! - translations: pull catalogs / push terms to Translized

use clap::{Parser, Subcommand};
use emlsync::locale::Locale;
use std::path::PathBuf;

/// emlsync - build and deploy multilingual email templates
#[derive(Parser, Debug)]
#[command(name = "emlsync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload rendered templates to Postmark (create or update by alias)
    Push {
        /// Limit by language
        #[arg(long, value_name = "CODE")]
        limit_lang: Option<Locale>,

        /// Limit by template set
        #[arg(long, value_name = "NAME")]
        limit_template_set: Option<String>,

        /// Upload all templates
        #[arg(long, conflicts_with_all = ["limit_lang", "limit_template_set"])]
        everything: bool,

        /// Skip the confirmation asked by --everything
        #[arg(short, long, requires = "everything")]
        yes: bool,
    },

    /// Render blueprints into per-locale HTML files
    Render,

    /// Translation catalog commands
    Translations {
        #[command(subcommand)]
        command: TranslationCommands,
    },
}

/// Translation subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TranslationCommands {
    /// Download every locale's .po catalog
    Pull,

    /// Register the .pot file's strings as terms
    Push {
        /// Template catalog to read (defaults to paths.pot_file)
        #[arg(long)]
        pot: Option<PathBuf>,
    },
}
