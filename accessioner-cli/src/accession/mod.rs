//! Spreadsheet-driven accessioning into ArchivesSpace
//!
//! Leaf modules resolve identifiers, containers, and agents and build the
//! payloads; `pipeline` drives one sheet row by row and `sweep` runs it over
//! every sheet on the drive.

pub mod action;
pub mod agents;
pub mod backup;
pub mod builder;
pub mod containers;
pub mod dates;
pub mod events;
pub mod pipeline;
pub mod resolver;
pub mod row;
pub mod sweep;

pub use action::Action;
pub use pipeline::{FileOutcome, RunContext};
pub use sweep::{DriveLayout, SweepReport, list_spreadsheets, relocate, sweep};
