//! CSV-backed spreadsheet adapters.
//!
//! A workbook is a directory; each tab is `<tab>.csv` inside it. Input is
//! the first column of a single CSV file, such as a sheet export.

use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::sheet::{InputSource, Workbook};

/// First column of a CSV file.
#[derive(Debug, Clone)]
pub struct CsvInput {
    path: PathBuf,
}

impl CsvInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InputSource for CsvInput {
    async fn read_column(&self) -> StoreResult<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            if let Some(value) = record.get(0) {
                let value = value.trim();
                if !value.is_empty() {
                    values.push(value.to_string());
                }
            }
        }

        debug!(path = %self.path.display(), count = values.len(), "Read input column");
        Ok(values)
    }
}

/// Directory of CSV tabs.
#[derive(Debug)]
pub struct CsvWorkbook {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvWorkbook {
    /// Open (creating if needed) a workbook directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tab_path(&self, tab: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", tab))
    }
}

#[async_trait]
impl Workbook for CsvWorkbook {
    async fn list_tabs(&self) -> StoreResult<Vec<String>> {
        let mut tabs = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tabs.push(stem.to_string());
                }
            }
        }
        tabs.sort();
        Ok(tabs)
    }

    async fn has_tab(&self, name: &str) -> StoreResult<bool> {
        Ok(self.tab_path(name).is_file())
    }

    async fn create_tab(&self, name: &str, headers: &[&str]) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.tab_path(name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => StoreError::TabExists(name.to_string()),
                _ => StoreError::Io(e),
            })?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(headers)?;
        writer.flush()?;
        Ok(())
    }

    async fn append_row(&self, tab: &str, row: &[String]) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let path = self.tab_path(tab);
        if !path.is_file() {
            return Err(StoreError::TabNotFound(tab.to_string()));
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }
}
