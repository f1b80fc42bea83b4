//! Command execution.

use std::io::Write;

use anyhow::{Context, Result, bail};
use keyset_sql::{Page, Paginator, Record, SqliteSource};
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use crate::config::{FileConfig, Settings};
use crate::output::write_page;

/// A page token the paginator rejected. Reported with its own exit status.
#[derive(Debug, Error)]
#[error("Invalid page ({token}): {message}")]
pub struct InvalidPage {
    /// The token as given
    pub token: String,
    /// Why it was rejected
    pub message: String,
}

/// Load configuration, open the database and run the command.
pub fn run(cli: &Cli) -> Result<()> {
    let file = FileConfig::discover(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli)?;
    debug!(?settings, "Resolved settings");

    let conn = Connection::open_with_flags(&settings.database, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("failed to open database {}", settings.database.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&conn, &settings, &cli.command, &mut out)
}

/// Run one command against an open connection, writing JSON lines to `out`.
pub fn execute<W: Write>(
    conn: &Connection,
    settings: &Settings,
    command: &Commands,
    out: &mut W,
) -> Result<()> {
    let paginator = settings.paginator()?;
    let source = SqliteSource::new(conn, settings.table.as_str())?
        .with_fields(settings.fields.iter().cloned())?;

    match command {
        Commands::Page { token } => {
            let page = fetch(&paginator, &source, token.as_deref())?;
            write_page(out, &page)
        },
        Commands::Walk {
            from,
            backward,
            max_pages,
        } => {
            let mut token = from.clone();
            let mut pages = 0usize;
            let mut rows = 0usize;
            loop {
                let page = fetch(&paginator, &source, token.as_deref())?;
                write_page(out, &page)?;
                pages += 1;
                rows += page.len();

                let following = if *backward {
                    page.previous_page_number()
                } else {
                    page.next_page_number()
                };
                if following.is_some() && following == token {
                    bail!("page token {} did not advance", following.unwrap_or_default());
                }
                token = following;
                if token.is_none() || max_pages.is_some_and(|max| pages >= max) {
                    break;
                }
            }
            info!(pages, rows, "Walk finished");
            Ok(())
        },
    }
}

fn fetch(
    paginator: &Paginator,
    source: &SqliteSource<'_>,
    token: Option<&str>,
) -> Result<Page<Record>> {
    paginator.page(source, token).map_err(|err| {
        if err.is_invalid_page() {
            anyhow::Error::new(InvalidPage {
                token: token.unwrap_or_default().to_string(),
                message: err.to_string(),
            })
        } else {
            anyhow::Error::new(err)
        }
    })
}
