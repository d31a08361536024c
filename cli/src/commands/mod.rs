//! CLI Commands

pub mod config;
pub mod dashboard;
pub mod draft;
pub mod import;
pub mod phone;
pub mod register;

use std::sync::Arc;

use anyhow::Result;
use connecta_forms::{FileDraftStore, PocketBaseClient};

use crate::config::Config;
use crate::output::OutputFormat;
use crate::Cli;

/// Everything a command needs, resolved from flags, environment and config.
pub struct Context {
    pub config: Config,
    pub format: OutputFormat,
    pub dev: bool,
}

impl Context {
    pub fn new(mut config: Config, cli: &Cli) -> Self {
        if let Some(url) = &cli.api_url {
            config.forms.api_url = url.clone();
        }
        let format = cli
            .format
            .or_else(|| config.default_format.as_deref().and_then(OutputFormat::parse))
            .unwrap_or_default();
        Self {
            config,
            format,
            dev: cli.dev,
        }
    }

    pub fn store(&self) -> Result<Arc<PocketBaseClient>> {
        Ok(Arc::new(PocketBaseClient::new(self.config.forms.pocketbase())?))
    }

    pub fn drafts(&self) -> Result<FileDraftStore> {
        Ok(FileDraftStore::new(self.config.draft_dir()?))
    }
}
