//! Domain module - entities, dataset shapes and in-memory tables
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod entity_kind;
pub mod records;
pub mod table;

pub use entity_kind::{EntityKind, FrontierKind};
pub use records::{DatasetRecord, Event, Fight, FightStat, Fighter, Gender};
pub use table::{Cell, Table, TableError};
