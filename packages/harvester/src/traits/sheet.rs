//! Spreadsheet store seam.
//!
//! Input is a single column of raw strings; output is a workbook with one
//! worksheet (tab) per project.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Source of raw input values (URLs, possibly malformed).
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Every non-empty value of the first column, in order.
    async fn read_column(&self) -> StoreResult<Vec<String>>;
}

/// Output workbook.
#[async_trait]
pub trait Workbook: Send + Sync {
    /// Names of the existing tabs.
    async fn list_tabs(&self) -> StoreResult<Vec<String>>;

    /// Whether a tab exists.
    async fn has_tab(&self, name: &str) -> StoreResult<bool> {
        Ok(self.list_tabs().await?.iter().any(|t| t == name))
    }

    /// Create a tab and write its header row.
    async fn create_tab(&self, name: &str, headers: &[&str]) -> StoreResult<()>;

    /// Append one row to an existing tab.
    async fn append_row(&self, tab: &str, row: &[String]) -> StoreResult<()>;
}
