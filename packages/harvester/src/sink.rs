//! Output sink: the project tab plus the dedup log.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::stores::DedupStore;
use crate::traits::sheet::Workbook;
use crate::types::record::ExtractedRecord;

/// Serializes row writes to one workbook tab and records completed URLs.
pub struct Sink {
    workbook: Arc<dyn Workbook>,
    tab: String,
    dedup: Arc<DedupStore>,
    write_lock: Mutex<()>,
}

impl Sink {
    pub fn new(workbook: Arc<dyn Workbook>, tab: impl Into<String>, dedup: Arc<DedupStore>) -> Self {
        Self {
            workbook,
            tab: tab.into(),
            dedup,
            write_lock: Mutex::new(()),
        }
    }

    pub fn tab(&self) -> &str {
        &self.tab
    }

    /// Append one record as a row. One writer at a time.
    pub async fn write(&self, record: &ExtractedRecord) -> StoreResult<()> {
        let row = record.to_row();
        let _guard = self.write_lock.lock().await;
        self.workbook.append_row(&self.tab, &row).await?;
        debug!(tab = %self.tab, name = %record.name, "Row written");
        Ok(())
    }

    /// Record `url` as completed for this project.
    ///
    /// A failure here is logged: the row is already written, and the only
    /// cost is that a later resume session revisits the URL.
    pub fn mark_completed(&self, url: &str) {
        if let Err(e) = self.dedup.record(url) {
            warn!(url, error = %e, "Failed to record completed URL");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryWorkbook;
    use crate::types::record::{ContactInfo, Field, HEADERS};

    fn record(name: &str) -> ExtractedRecord {
        ExtractedRecord {
            name: Field::Found(name.to_string()),
            category: Field::NotFound,
            address: Field::NotFound,
            phone: Field::NotFound,
            website: Field::NotFound,
            contact: ContactInfo::empty(),
        }
    }

    #[tokio::test]
    async fn test_concurrent_writes_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let book = Arc::new(MemoryWorkbook::new());
        book.create_tab("roma", &HEADERS).await.unwrap();
        let dedup = Arc::new(DedupStore::open(dir.path(), "roma").unwrap());
        let sink = Arc::new(Sink::new(book.clone(), "roma", dedup.clone()));

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let sink = sink.clone();
                tokio::spawn(async move {
                    sink.write(&record(&format!("Bar {}", i))).await.unwrap();
                    sink.mark_completed(&format!("https://maps.example/{}", i));
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(book.data_row_count("roma"), 10);
        assert_eq!(dedup.len(), 10);
    }

    #[tokio::test]
    async fn test_failed_write_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let book = Arc::new(MemoryWorkbook::new());
        book.create_tab("roma", &HEADERS).await.unwrap();
        book.set_fail_writes(true);
        let dedup = Arc::new(DedupStore::open(dir.path(), "roma").unwrap());
        let sink = Sink::new(book.clone(), "roma", dedup);

        assert!(sink.write(&record("Bar")).await.is_err());
        assert_eq!(book.data_row_count("roma"), 0);
    }
}
