//! In-memory spreadsheet for testing and development.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::sheet::{InputSource, Workbook};

#[derive(Debug, Clone)]
struct Tab {
    name: String,
    rows: Vec<Vec<String>>,
}

/// Workbook kept entirely in memory.
///
/// Useful for testing. Data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryWorkbook {
    tabs: RwLock<Vec<Tab>>,
    fail_writes: AtomicBool,
}

impl MemoryWorkbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pre-existing tab with rows (header included).
    pub fn with_tab(self, name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        self.tabs.write().unwrap().push(Tab {
            name: name.into(),
            rows,
        });
        self
    }

    /// Make every subsequent `append_row` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All rows of a tab, header included.
    pub fn rows(&self, tab: &str) -> Option<Vec<Vec<String>>> {
        self.tabs
            .read()
            .unwrap()
            .iter()
            .find(|t| t.name == tab)
            .map(|t| t.rows.clone())
    }

    /// Number of data rows (header excluded).
    pub fn data_row_count(&self, tab: &str) -> usize {
        self.rows(tab).map(|r| r.len().saturating_sub(1)).unwrap_or(0)
    }
}

#[async_trait]
impl Workbook for MemoryWorkbook {
    async fn list_tabs(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .tabs
            .read()
            .unwrap()
            .iter()
            .map(|t| t.name.clone())
            .collect())
    }

    async fn create_tab(&self, name: &str, headers: &[&str]) -> StoreResult<()> {
        let mut tabs = self.tabs.write().unwrap();
        if tabs.iter().any(|t| t.name == name) {
            return Err(StoreError::TabExists(name.to_string()));
        }
        tabs.push(Tab {
            name: name.to_string(),
            rows: vec![headers.iter().map(|h| h.to_string()).collect()],
        });
        Ok(())
    }

    async fn append_row(&self, tab: &str, row: &[String]) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("memory workbook set to fail".to_string()));
        }

        let mut tabs = self.tabs.write().unwrap();
        let target = tabs
            .iter_mut()
            .find(|t| t.name == tab)
            .ok_or_else(|| StoreError::TabNotFound(tab.to_string()))?;
        target.rows.push(row.to_vec());
        Ok(())
    }
}

/// Fixed list of raw input values.
#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    values: Vec<String>,
}

impl MemoryInput {
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl InputSource for MemoryInput {
    async fn read_column(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .values
            .iter()
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tab_lifecycle() {
        let book = MemoryWorkbook::new();
        book.create_tab("roma", &["a", "b"]).await.unwrap();
        assert!(book.has_tab("roma").await.unwrap());
        assert!(matches!(
            book.create_tab("roma", &["a"]).await,
            Err(StoreError::TabExists(_))
        ));

        book.append_row("roma", &["1".into(), "2".into()])
            .await
            .unwrap();
        assert_eq!(book.data_row_count("roma"), 1);
        assert_eq!(book.rows("roma").unwrap()[0], vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_append_to_missing_tab_fails() {
        let book = MemoryWorkbook::new();
        let err = book.append_row("nope", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::TabNotFound(_)));
    }

    #[tokio::test]
    async fn test_fail_writes_switch() {
        let book = MemoryWorkbook::new().with_tab("roma", vec![vec!["h".into()]]);
        book.set_fail_writes(true);
        assert!(book.append_row("roma", &["x".into()]).await.is_err());
        book.set_fail_writes(false);
        assert!(book.append_row("roma", &["x".into()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_input_skips_blanks() {
        let input = MemoryInput::new(["https://a.example", "  ", "b"]);
        assert_eq!(input.read_column().await.unwrap().len(), 2);
    }
}
