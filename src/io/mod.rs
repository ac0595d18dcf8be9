//! Table ingestion, column mapping, and result export.

/// CSV export of daily outcomes.
pub mod export;
pub mod mapping;
/// Delimited text parsing into energy records.
pub mod table;

pub use mapping::ColumnMapping;
pub use table::{parse_records, read_headers};
