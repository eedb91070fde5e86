//! Normalisation/join stage
//!
//! Runs once after ingestion, fully in memory:
//!
//! 1. surrogate keys for every row lacking one, continuing the existing numbering
//! 2. lookup tables (event name, fight URL, fighter full name → key)
//! 3. foreign-key rewrite, name → key
//! 4. staging datasets rewritten with the added columns; final tables projected
//!    to the fixed column order and written to the output directory
//!
//! Missing columns and unresolved names are recorded in the report and never
//! abort the stage. Only storage failures do.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{EntityKind, Table, TableError};
use crate::infrastructure::dataset_store::write_table;
use crate::infrastructure::{DatasetStore, StoreError};

#[derive(Error, Debug)]
pub enum NormalizationError {
    /// Non-fatal: the rewrite of `field` in `dataset` was skipped
    #[error("skipped {dataset}.{field}: missing column '{column}'")]
    MissingColumn {
        dataset: EntityKind,
        field: String,
        column: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("normalization task failed: {0}")]
    Task(String),
}

impl NormalizationError {
    fn skipped(field: &str, err: TableError) -> Self {
        let TableError::MissingColumn { dataset, column } = err;
        Self::MissingColumn {
            dataset,
            field: field.to_string(),
            column,
        }
    }
}

/// A name that had no match in its lookup table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub dataset: EntityKind,
    pub column: String,
    /// Zero-based data row
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Default)]
pub struct NormalizationReport {
    pub keys_assigned: BTreeMap<EntityKind, usize>,
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedReference>,
    pub skipped: Vec<NormalizationError>,
}

impl NormalizationReport {
    fn skip(&mut self, field: &str, err: TableError) {
        let err = NormalizationError::skipped(field, err);
        error!("❌ {}", err);
        self.skipped.push(err);
    }
}

/// The four datasets, loaded together
#[derive(Debug, Clone)]
pub struct Datasets {
    pub events: Table,
    pub fights: Table,
    pub fight_stats: Table,
    pub fighters: Table,
}

impl Datasets {
    /// Load all four; a dataset not scraped yet is an empty raw-schema table
    pub fn load(store: &DatasetStore) -> Result<Self, StoreError> {
        let load = |kind: EntityKind| -> Result<Table, StoreError> {
            Ok(store.load(kind)?.unwrap_or_else(|| {
                warn!("{} not found, normalising an empty {} dataset", store.path(kind).display(), kind);
                Table::with_raw_schema(kind)
            }))
        };
        Ok(Self {
            events: load(EntityKind::Event)?,
            fights: load(EntityKind::Fight)?,
            fight_stats: load(EntityKind::FightStat)?,
            fighters: load(EntityKind::Fighter)?,
        })
    }

    pub fn get(&self, kind: EntityKind) -> &Table {
        match kind {
            EntityKind::Event => &self.events,
            EntityKind::Fight => &self.fights,
            EntityKind::FightStat => &self.fight_stats,
            EntityKind::Fighter => &self.fighters,
        }
    }

    pub fn get_mut(&mut self, kind: EntityKind) -> &mut Table {
        match kind {
            EntityKind::Event => &mut self.events,
            EntityKind::Fight => &mut self.fights,
            EntityKind::FightStat => &mut self.fight_stats,
            EntityKind::Fighter => &mut self.fighters,
        }
    }
}

fn parse_key(cell: Option<&str>) -> Option<u64> {
    cell.and_then(|v| v.trim().parse().ok())
}

/// A non-null cell that is not yet an integer key
fn still_a_name(cell: Option<&str>) -> Option<&str> {
    cell.filter(|v| v.trim().parse::<u64>().is_err())
}

/// Key every row lacking a surrogate key.
///
/// New keys continue after the current maximum and are handed out bottom-up
/// among the unkeyed rows, so a table with no key column gets row 1 → N ... row N → 1.
/// Returns the number of keys assigned.
pub fn assign_surrogate_keys(table: &mut Table) -> usize {
    let key_column = table.kind().surrogate_key();
    let key = table.ensure_column(key_column);

    let max = table
        .column_values(key)
        .filter_map(|v| v.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let unkeyed: Vec<usize> = (0..table.len())
        .filter(|&row| parse_key(table.cell(row, key)).is_none())
        .collect();

    let mut next = max;
    for &row in unkeyed.iter().rev() {
        next += 1;
        table.set_cell(row, key, Some(next.to_string()));
    }

    if !unkeyed.is_empty() {
        info!("🔑 Assigned {} {} keys ({}..={})", unkeyed.len(), key_column, max + 1, next);
    }
    unkeyed.len()
}

/// Fighter name as fight pages spell it
fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(first), None) => Some(first.to_string()),
        (None, _) => None,
    }
}

#[derive(Debug, Default, Clone)]
pub struct LookupTables {
    pub event_by_name: HashMap<String, String>,
    pub fight_by_url: HashMap<String, String>,
    pub fighter_by_name: HashMap<String, String>,
}

fn insert_key(map: &mut HashMap<String, String>, dataset: EntityKind, name: String, key: &str) {
    if let Some(previous) = map.insert(name.clone(), key.to_string()) {
        if previous != key {
            debug!("Duplicate {} name '{}': key {} replaces {}", dataset, name, key, previous);
        }
    }
}

fn name_to_key(
    table: &Table,
    name_column: &str,
    report: &mut NormalizationReport,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let columns = table
        .require_column(name_column)
        .and_then(|name| Ok((name, table.require_column(table.kind().surrogate_key())?)));
    let (name, key) = match columns {
        Ok(columns) => columns,
        Err(e) => {
            report.skip(&format!("{} lookup", table.kind()), e);
            return map;
        }
    };

    for row in 0..table.len() {
        if let (Some(value), Some(id)) = (table.cell(row, name), table.cell(row, key)) {
            insert_key(&mut map, table.kind(), value.to_string(), id);
        }
    }
    map
}

impl LookupTables {
    pub fn build(datasets: &Datasets, report: &mut NormalizationReport) -> Self {
        let event_by_name = name_to_key(&datasets.events, "event_name", report);
        let fight_by_url = name_to_key(&datasets.fights, "fight_url", report);

        let fighters = &datasets.fighters;
        let mut fighter_by_name = HashMap::new();
        let columns = fighters.require_column("fighter_f_name").and_then(|f| {
            Ok((
                f,
                fighters.require_column("fighter_l_name")?,
                fighters.require_column("fighter_id")?,
            ))
        });
        match columns {
            Ok((first, last, key)) => {
                for row in 0..fighters.len() {
                    let name = full_name(fighters.cell(row, first), fighters.cell(row, last));
                    if let (Some(name), Some(id)) = (name, fighters.cell(row, key)) {
                        insert_key(&mut fighter_by_name, EntityKind::Fighter, name, id);
                    }
                }
            }
            Err(e) => report.skip("fighter lookup", e),
        }

        debug!(
            "Lookups: {} events, {} fights, {} fighters",
            event_by_name.len(),
            fight_by_url.len(),
            fighter_by_name.len()
        );
        Self {
            event_by_name,
            fight_by_url,
            fighter_by_name,
        }
    }
}

/// Fill `target` from `source` through `lookup` on rows where `target` is null
fn fill_foreign_key(
    table: &mut Table,
    target: &str,
    source: &str,
    lookup: &HashMap<String, String>,
    report: &mut NormalizationReport,
) {
    let source_index = match table.require_column(source) {
        Ok(index) => index,
        Err(e) => return report.skip(target, e),
    };
    let target_index = table.ensure_column(target);

    for row in 0..table.len() {
        if table.cell(row, target_index).is_some() {
            continue;
        }
        let Some(value) = table.cell(row, source_index).map(str::to_string) else {
            continue;
        };
        resolve(table, row, target_index, &value, lookup, report);
    }
}

/// Replace names in `column` by keys wherever the cell is still a name
fn rewrite_names(
    table: &mut Table,
    column: &str,
    lookup: &HashMap<String, String>,
    report: &mut NormalizationReport,
) {
    let index = match table.require_column(column) {
        Ok(index) => index,
        Err(e) => return report.skip(column, e),
    };

    for row in 0..table.len() {
        let Some(name) = still_a_name(table.cell(row, index)).map(str::to_string) else {
            continue;
        };
        resolve(table, row, index, &name, lookup, report);
    }
}

fn resolve(
    table: &mut Table,
    row: usize,
    column: usize,
    value: &str,
    lookup: &HashMap<String, String>,
    report: &mut NormalizationReport,
) {
    if let Some(key) = lookup.get(value) {
        table.set_cell(row, column, Some(key.clone()));
        report.resolved += 1;
        return;
    }

    let column_name = table.columns()[column].clone();
    warn!("⚠️ No {} match for '{}' ({} row {})", column_name, value, table.kind(), row + 1);
    report.unresolved.push(UnresolvedReference {
        dataset: table.kind(),
        column: column_name,
        row,
        value: value.to_string(),
    });
}

/// Keys, lookups and foreign-key rewrite over the staging datasets
pub fn normalize(datasets: &mut Datasets) -> NormalizationReport {
    let mut report = NormalizationReport::default();

    info!("Adding primary keys");
    for kind in EntityKind::ALL {
        let assigned = assign_surrogate_keys(datasets.get_mut(kind));
        report.keys_assigned.insert(kind, assigned);
    }

    let lookups = LookupTables::build(datasets, &mut report);

    info!("Adding foreign keys");
    let fights = &mut datasets.fights;
    fill_foreign_key(fights, "event_id", "event_name", &lookups.event_by_name, &mut report);
    for column in ["f_1", "f_2", "winner"] {
        rewrite_names(fights, column, &lookups.fighter_by_name, &mut report);
    }

    let stats = &mut datasets.fight_stats;
    rewrite_names(stats, "fighter_id", &lookups.fighter_by_name, &mut report);
    fill_foreign_key(stats, "fight_id", "fight_url", &lookups.fight_by_url, &mut report);

    report
}

/// Project to the final column order; foreign keys that are still names become null
pub fn final_table(table: &Table, report: &mut NormalizationReport) -> Result<Table, TableError> {
    let kind = table.kind();
    let mut staged = table.clone();
    for column in kind.final_columns() {
        if !staged.has_column(column) {
            let missing = TableError::MissingColumn {
                dataset: kind,
                column: (*column).to_string(),
            };
            report.skip(&format!("{kind} output"), missing);
            staged.ensure_column(column);
        }
    }

    let mut projected = staged.project(kind.final_columns())?;
    for column in kind.foreign_key_columns() {
        let index = projected.require_column(column)?;
        for row in 0..projected.len() {
            if still_a_name(projected.cell(row, index)).is_some() {
                projected.set_cell(row, index, None);
            }
        }
    }
    Ok(projected)
}

/// Loads, normalises and persists the four datasets
#[derive(Debug, Clone)]
pub struct NormalizationStage {
    datasets: DatasetStore,
    output_dir: PathBuf,
}

impl NormalizationStage {
    pub fn new(datasets: DatasetStore, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            datasets,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_path(&self, kind: EntityKind) -> PathBuf {
        self.output_dir.join(kind.dataset_file_name())
    }

    pub fn run(&self) -> Result<NormalizationReport, NormalizationError> {
        let mut datasets = Datasets::load(&self.datasets)?;
        let mut report = normalize(&mut datasets);

        for kind in EntityKind::ALL {
            let table = datasets.get(kind);
            self.datasets.replace(table)?;

            match final_table(table, &mut report) {
                Ok(output) => write_table(&self.output_path(kind), &output)?,
                Err(e) => report.skip(&format!("{kind} output"), e),
            }
        }

        info!(
            "✅ Tables normalised: {} references resolved, {} unresolved, {} skipped rewrites",
            report.resolved,
            report.unresolved.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
