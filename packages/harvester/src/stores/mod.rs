//! Storage implementations.
//!
//! - `DedupStore` - per-project completed-URL log
//! - `CsvWorkbook` / `CsvInput` - CSV-backed spreadsheet adapters
//! - `MemoryWorkbook` / `MemoryInput` - in-memory spreadsheet for tests

pub mod csv;
pub mod dedup;
pub mod memory;

pub use self::csv::{CsvInput, CsvWorkbook};
pub use dedup::{sanitize_project_name, DedupStore};
pub use memory::{MemoryInput, MemoryWorkbook};
