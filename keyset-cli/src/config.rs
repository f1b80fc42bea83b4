//! Configuration loading: TOML file plus command-line overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use keyset_sql::{Paginator, SortKeySpec, ValueKind};
use serde::Deserialize;

use crate::cli::Cli;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "keyset.toml";

/// Rows per page when neither the file nor the command line sets it.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Contents of a `keyset.toml` file.
///
/// ```toml
/// database = "events.db"
/// table = "events"
/// order = "-timestamp,group"
/// per_page = 5
/// fields = ["reading", "timestamp", "group"]
///
/// [kinds]
/// timestamp = "timestamp"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// SQLite database path, relative to the working directory
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Table to page through
    #[serde(default)]
    pub table: Option<String>,

    /// Sort key in signed form
    #[serde(default)]
    pub order: Option<String>,

    /// Rows per page
    #[serde(default)]
    pub per_page: Option<usize>,

    /// Columns to select
    #[serde(default)]
    pub fields: Vec<String>,

    /// Key column value kinds (`column = "kind"`)
    #[serde(default)]
    pub kinds: BTreeMap<String, String>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load the file named on the command line, or the default file if it
    /// exists, or nothing.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            },
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SQLite database path
    pub database: PathBuf,
    /// Table to page through
    pub table: String,
    /// Sort key in signed form
    pub order: String,
    /// Rows per page
    pub per_page: usize,
    /// Columns to select; empty selects all
    pub fields: Vec<String>,
    /// Key column value kinds
    pub kinds: BTreeMap<String, ValueKind>,
}

impl Settings {
    /// Merge a config file with command-line flags. Flags win.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self> {
        let mut kinds = BTreeMap::new();
        for (column, kind) in &file.kinds {
            let kind: ValueKind = kind
                .parse()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("kind for column '{column}'"))?;
            kinds.insert(column.clone(), kind);
        }
        kinds.extend(cli.kinds.iter().cloned());

        let Some(database) = cli.database.clone().or(file.database) else {
            bail!("no database given (use --database or set `database` in the config file)");
        };
        let Some(table) = cli.table.clone().or(file.table) else {
            bail!("no table given (use --table or set `table` in the config file)");
        };
        let Some(order) = cli.order.clone().or(file.order) else {
            bail!("no ordering given (use --order or set `order` in the config file)");
        };

        let fields = if cli.fields.is_empty() {
            file.fields
        } else {
            cli.fields.clone()
        };

        Ok(Self {
            database,
            table,
            order,
            per_page: cli.per_page.or(file.per_page).unwrap_or(DEFAULT_PER_PAGE),
            fields,
            kinds,
        })
    }

    /// Build the paginator these settings describe.
    pub fn paginator(&self) -> Result<Paginator> {
        let mut keys = SortKeySpec::parse(&self.order)
            .with_context(|| format!("invalid ordering '{}'", self.order))?;
        for (column, kind) in &self.kinds {
            keys = keys.with_kind(column, *kind)?;
        }
        Ok(Paginator::new(keys, self.per_page)?)
    }
}
