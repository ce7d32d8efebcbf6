//! CLI module for emlsync - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for rendering blueprints,
//! pushing templates and syncing translations.

pub mod commands;

pub use commands::Cli;
