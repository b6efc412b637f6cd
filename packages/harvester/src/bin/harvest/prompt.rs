//! Interactive prompts for the pieces not given on the command line.

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use harvester::{project, StartMode, Workbook};
use std::io;
use std::path::PathBuf;

/// Whether `err` comes from the user aborting a prompt with Ctrl-C.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
            || matches!(
                cause.downcast_ref::<dialoguer::Error>(),
                Some(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::Interrupted
            )
    })
}

pub fn ask_path(prompt: &str) -> Result<PathBuf> {
    let value: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?;
    Ok(PathBuf::from(value.trim()))
}

fn ask_project_name() -> Result<String> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("🏷️  New project name")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Project name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(name)
}

/// Pick an existing project or create a new one. Returns the tab name.
pub async fn choose_project(workbook: &dyn Workbook) -> Result<String> {
    let existing = project::list_projects(workbook).await?;

    if existing.is_empty() {
        println!("   {}", style("(No existing projects)").dim());
        let name = ask_project_name()?;
        return Ok(project::create_project(workbook, &name).await?);
    }

    let mut items: Vec<String> = existing.clone();
    items.push("[NEW PROJECT]".to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("📋 Choose a project")
        .items(&items)
        .default(0)
        .interact()?;

    match existing.get(selection) {
        Some(tab) => Ok(project::open_project(workbook, tab).await?),
        None => {
            let name = ask_project_name()?;
            Ok(project::create_project(workbook, &name).await?)
        }
    }
}

pub fn choose_mode(project: &str) -> Result<StartMode> {
    println!("\n❓ Project: '{}'", style(project).bold());
    let options = vec![
        "Restart from scratch (clear this project's log)",
        "Resume (skip URLs already processed for this project)",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose")
        .items(&options)
        .default(1)
        .interact()?;

    Ok(match selection {
        0 => StartMode::Restart,
        _ => StartMode::Resume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_interrupted_prompt_is_recognised() {
        let aborted: Result<()> = Err(dialoguer::Error::IO(io::Error::new(
            io::ErrorKind::Interrupted,
            "read interrupted",
        )))
        .context("project prompt");
        assert!(is_interrupted(&aborted.unwrap_err()));

        let missing: Result<()> =
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file")).context("input");
        assert!(!is_interrupted(&missing.unwrap_err()));
        assert!(!is_interrupted(&anyhow::anyhow!("no project given")));
    }
}
