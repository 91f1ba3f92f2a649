//! Command-line flags and the YAML service configuration.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "todo", about = "REST backend for a todo list", disable_version_flag = true)]
pub struct Cli {
    /// JSON snapshot file used when `dbType` is `json`.
    #[arg(long, env = "TODO_DB", default_value = "db.json")]
    pub db: PathBuf,

    /// Path to the configuration file.
    #[arg(long, env = "TODO_CONFIG", default_value = "config.yml")]
    pub config: PathBuf,

    /// Log file, appended to.
    #[arg(long, env = "TODO_LOG", default_value = "todo.log")]
    pub log: PathBuf,

    /// Trace-level logging with source locations.
    #[arg(long)]
    pub debug: bool,

    /// Print version information and exit.
    #[arg(long)]
    pub version: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default)]
    pub db_type: DbType,
    #[serde(default)]
    pub database_url: Option<String>,
}

fn default_addr() -> String { "127.0.0.1:3000".to_string() }

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("could not read configuration {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("could not load configuration {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(raw)?;
        if config.db_type == DbType::Sqlite && config.database_url.is_none() {
            bail!("`databaseUrl` is required when `dbType` is sqlite");
        }
        Ok(config)
    }
}
