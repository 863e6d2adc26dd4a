use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$GANTTLINE_HOME`, or `~/.ganttline`.
pub fn ganttline_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("GANTTLINE_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ganttline"))
}

pub fn ensure_ganttline_home() -> Result<PathBuf> {
    let dir = ganttline_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where the JSON snapshot of projects and tasks lives.
pub fn data_path() -> Result<PathBuf> {
    Ok(ensure_ganttline_home()?.join("data.json"))
}
