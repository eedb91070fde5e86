//! CSV-backed entity datasets
//!
//! Scraped datasets are append-only during ingestion. Normalisation rewrites
//! them whole (temp file + rename) with the key columns it adds; later
//! appends are aligned to whatever header the file carries by then.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::table::cell_from_field;
use crate::domain::{DatasetRecord, EntityKind, Table};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },
}

impl StoreError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory of `ufc_*_data.csv` files
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(kind.dataset_file_name())
    }

    pub fn exists(&self, kind: EntityKind) -> bool {
        self.path(kind).exists()
    }

    /// Create the dataset with its raw header if absent. Returns `true` when created.
    pub fn ensure_dataset(&self, kind: EntityKind) -> Result<bool, StoreError> {
        let path = self.path(kind);
        if path.exists() {
            info!("Scraping to existing file {}", path.display());
            return Ok(false);
        }

        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut writer = csv::Writer::from_path(&path).map_err(|e| StoreError::csv(&path, e))?;
        writer
            .write_record(kind.raw_columns())
            .map_err(|e| StoreError::csv(&path, e))?;
        writer.flush().map_err(|e| StoreError::io(&path, e))?;

        info!("📄 Created {}", path.display());
        Ok(true)
    }

    /// Load the whole dataset, or `None` if the file does not exist yet
    pub fn load(&self, kind: EntityKind) -> Result<Option<Table>, StoreError> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(None);
        }
        read_table(kind, &path).map(Some)
    }

    /// Rewrite the dataset with `table` (used by normalisation)
    pub fn replace(&self, table: &Table) -> Result<(), StoreError> {
        write_table(&self.path(table.kind()), table)
    }

    /// Open an appender aligned with the dataset's current header
    pub fn open_writer(&self, kind: EntityKind) -> Result<DatasetWriter, StoreError> {
        self.ensure_dataset(kind)?;
        let path = self.path(kind);
        let header = read_header(&path)?;

        let raw = kind.raw_columns();
        let layout: Vec<Option<usize>> = header
            .iter()
            .map(|column| raw.iter().position(|r| r == column))
            .collect();
        for column in raw {
            if !header.iter().any(|h| h == column) {
                warn!("{} has no '{}' column; values will be dropped", path.display(), column);
            }
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        let writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        debug!("Opened {} for append ({} columns)", path.display(), header.len());
        Ok(DatasetWriter {
            kind,
            path,
            layout,
            writer,
            rows_written: 0,
        })
    }
}

/// Single writer owning one dataset file
pub struct DatasetWriter {
    kind: EntityKind,
    path: PathBuf,
    /// Header position → index into `kind.raw_columns()`
    layout: Vec<Option<usize>>,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl DatasetWriter {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn append<R: DatasetRecord>(&mut self, record: &R) -> Result<(), StoreError> {
        debug_assert_eq!(R::KIND, self.kind);
        let values = record.values();
        let row: Vec<&str> = self
            .layout
            .iter()
            .map(|slot| {
                slot.and_then(|i| values.get(i))
                    .and_then(|v| v.as_deref())
                    .unwrap_or("")
            })
            .collect();

        self.writer
            .write_record(&row)
            .map_err(|e| StoreError::csv(&self.path, e))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Push buffered rows to disk; called once per scraped page
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.flush().map_err(|e| StoreError::io(&self.path, e))
    }
}

fn read_header(path: &Path) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;
    match reader.records().next() {
        Some(record) => {
            let record = record.map_err(|e| StoreError::csv(path, e))?;
            Ok(record.iter().map(str::to_string).collect())
        }
        None => Err(StoreError::MissingHeader {
            path: path.to_path_buf(),
        }),
    }
}

/// Read a CSV file with a header row into a table
pub fn read_table(kind: EntityKind, path: &Path) -> Result<Table, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| StoreError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return Err(StoreError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut table = Table::new(kind, columns);
    for record in reader.records() {
        let record = record.map_err(|e| StoreError::csv(path, e))?;
        table.push_row(record.iter().map(cell_from_field).collect());
    }
    debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Write `table` to `path`, replacing any previous content
pub fn write_table(path: &Path, table: &Table) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer =
            csv::Writer::from_path(&tmp_path).map_err(|e| StoreError::csv(&tmp_path, e))?;
        writer
            .write_record(table.columns())
            .map_err(|e| StoreError::csv(&tmp_path, e))?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
                .map_err(|e| StoreError::csv(&tmp_path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&tmp_path, e))?;
    }
    fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
