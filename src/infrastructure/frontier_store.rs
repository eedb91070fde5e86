//! Frontier (URL list) persistence and dedup against already-scraped datasets

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::{FrontierKind, Table, TableError};
use crate::infrastructure::dataset_store::StoreError;

/// Candidates not yet present under `natural_key_field` in `existing`.
///
/// Relative order is preserved. A dataset that doesn't exist yet filters nothing.
pub fn pending(
    candidates: &[String],
    existing: Option<&Table>,
    natural_key_field: &str,
) -> Result<Vec<String>, TableError> {
    let Some(table) = existing else {
        return Ok(candidates.to_vec());
    };

    let column = table.require_column(natural_key_field)?;
    let scraped: HashSet<&str> = table.column_values(column).collect();

    Ok(candidates
        .iter()
        .filter(|url| !scraped.contains(url.as_str()))
        .cloned()
        .collect())
}

/// One-URL-per-row list files under the `urls/` directory
#[derive(Debug, Clone)]
pub struct FrontierStore {
    dir: PathBuf,
}

impl FrontierStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, kind: FrontierKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// URLs in file order. A missing file is an empty frontier.
    pub fn load(&self, kind: FrontierKind) -> Result<Vec<String>, StoreError> {
        let path = self.path(kind);
        if !path.exists() {
            warn!("Missing file {} - run link discovery first", path.display());
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| StoreError::csv(&path, e))?;

        let mut urls = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| StoreError::csv(&path, e))?;
            if let Some(url) = record.get(0).map(str::trim).filter(|u| !u.is_empty()) {
                urls.push(url.to_string());
            }
        }
        debug!("Loaded {} {} from {}", urls.len(), kind, path.display());
        Ok(urls)
    }

    /// Overwrite the frontier file
    pub fn save(&self, kind: FrontierKind, urls: &[String]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let path = self.path(kind);
        write_urls(&path, urls)?;
        info!("💾 Saved {} {} to {}", urls.len(), kind, path.display());
        Ok(())
    }
}

fn write_urls(path: &Path, urls: &[String]) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    for url in urls {
        writer
            .write_record([url.as_str()])
            .map_err(|e| StoreError::csv(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
