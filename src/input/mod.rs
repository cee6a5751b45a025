//! Domain list input.
//!
//! Rows are comma separated: `domain,<ignored>,agency[,...]`. Lines starting
//! with `#` are comments. Rows that cannot be read are skipped.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEntry {
    pub domain: String,
    pub agency: String,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open domain list {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Read every usable row of the list at `path`.
pub fn read_domain_list(path: &Path) -> Result<Vec<DomainEntry>, InputError> {
    let reader = builder()
        .from_path(path)
        .map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(collect_entries(reader))
}

/// Parse a domain list from any reader.
pub fn parse_domain_list<R: Read>(input: R) -> Vec<DomainEntry> {
    collect_entries(builder().from_reader(input))
}

fn builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'));
    builder
}

fn collect_entries<R: Read>(mut reader: csv::Reader<R>) -> Vec<DomainEntry> {
    let mut entries = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                tracing::warn!(row = index + 1, error = %err, "skipping unreadable row");
                continue;
            }
        };
        let domain = row.get(0).unwrap_or_default();
        if domain.is_empty() {
            tracing::warn!(row = index + 1, "skipping row without domain");
            continue;
        }
        entries.push(DomainEntry {
            domain: domain.to_string(),
            agency: row.get(2).unwrap_or_default().to_string(),
        });
    }
    entries
}
