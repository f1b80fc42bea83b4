//! CLI commands and argument parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keyset_sql::ValueKind;

/// Page through a SQLite table without OFFSET
#[derive(Parser, Debug)]
#[command(name = "keyset")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to ./keyset.toml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Table to page through
    #[arg(short, long, global = true)]
    pub table: Option<String>,

    /// Sort key, e.g. "-timestamp,group" (leading '-' sorts descending)
    #[arg(short, long, global = true)]
    pub order: Option<String>,

    /// Rows per page
    #[arg(short = 'n', long, global = true)]
    pub per_page: Option<usize>,

    /// Columns to select (comma-separated, empty = all)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Declare a key column's value kind, e.g. timestamp=timestamp (repeatable)
    #[arg(short, long = "kind", global = true, value_parser = parse_kind)]
    pub kinds: Vec<(String, ValueKind)>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page
    Page {
        /// Page token; omit (or pass 1) for the first page
        token: Option<String>,
    },

    /// Follow page tokens until the end of the table
    Walk {
        /// Token to start from; omit for the first page
        #[arg(long)]
        from: Option<String>,

        /// Follow previous tokens instead of next tokens
        #[arg(long)]
        backward: bool,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },
}

fn parse_kind(s: &str) -> Result<(String, ValueKind), String> {
    let (column, kind) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=KIND, got '{s}'"))?;
    Ok((column.trim().to_string(), kind.parse()?))
}
