//! UFC Stats harvester - incremental scraping and normalisation of ufcstats.com
//!
//! The crate harvests events, fights, per-fighter fight statistics and fighters
//! into append-only CSV datasets, then reconciles them into four relational
//! tables with surrogate and foreign keys.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod cli;

pub use cli::run;
