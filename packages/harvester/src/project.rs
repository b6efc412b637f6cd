//! Projects: one output tab plus one dedup log each.

use chrono::{Local, NaiveDateTime};
use std::path::Path;
use tracing::info;

use crate::error::{HarvestError, Result};
use crate::stores::DedupStore;
use crate::traits::sheet::Workbook;
use crate::types::record::HEADERS;

/// Whether a session keeps or discards a project's progress log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Skip URLs already completed for the project
    #[default]
    Resume,
    /// Clear the progress log first and reprocess everything
    Restart,
}

const TAB_STAMP: &str = "%Y%m%d_%H%M%S";

/// Tab name for a new project: `<name>_<YYYYmmdd_HHMMSS>`.
pub fn new_tab_name(name: &str) -> String {
    format!("{}_{}", name, Local::now().format(TAB_STAMP))
}

/// Most recent tab created for project `name`, if any.
///
/// Only tabs named exactly `<name>_<YYYYmmdd_HHMMSS>` count; the stamp sorts
/// chronologically as text.
pub fn latest_project_tab<'a>(tabs: &'a [String], name: &str) -> Option<&'a str> {
    tabs.iter()
        .map(String::as_str)
        .filter(|tab| {
            tab.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|stamp| NaiveDateTime::parse_from_str(stamp, TAB_STAMP).is_ok())
        })
        .max()
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HarvestError::InvalidProject(name.to_string()));
    }
    Ok(name)
}

/// Existing projects, one per tab.
pub async fn list_projects(workbook: &dyn Workbook) -> Result<Vec<String>> {
    Ok(workbook.list_tabs().await?)
}

/// Create a fresh tab for `name` with the header row. Returns the tab name.
pub async fn create_project(workbook: &dyn Workbook, name: &str) -> Result<String> {
    let tab = new_tab_name(validate_name(name)?);
    workbook.create_tab(&tab, &HEADERS).await?;
    info!(project = %tab, "Created project tab");
    Ok(tab)
}

/// Reuse an existing tab. Fails if there is none called `name`.
pub async fn open_project(workbook: &dyn Workbook, name: &str) -> Result<String> {
    let name = validate_name(name)?;
    if !workbook.has_tab(name).await? {
        return Err(HarvestError::InvalidProject(name.to_string()));
    }
    Ok(name.to_string())
}

/// Resolve `name` to a tab without prompting.
///
/// An exact tab name wins, then the newest `<name>_<stamp>` tab. A new
/// project is created only when neither exists.
pub async fn open_or_create(workbook: &dyn Workbook, name: &str) -> Result<String> {
    let name = validate_name(name)?;
    if workbook.has_tab(name).await? {
        return Ok(name.to_string());
    }

    let tabs = workbook.list_tabs().await?;
    match latest_project_tab(&tabs, name) {
        Some(tab) => {
            info!(project = %tab, "Reusing latest project tab");
            Ok(tab.to_string())
        }
        None => create_project(workbook, name).await,
    }
}

/// Open the project's progress log, clearing it first on restart.
pub fn prepare_progress(dir: &Path, project: &str, mode: StartMode) -> Result<DedupStore> {
    if mode == StartMode::Restart && DedupStore::clear(dir, project)? {
        info!(project, "Progress log cleared, starting over");
    }
    Ok(DedupStore::open(dir, project)?)
}
