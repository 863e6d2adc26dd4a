use anyhow::{Context, Result};
use ganttline_core::DEFAULT_PROJECT_COLOR;
use ganttline_core::chain::DEFAULT_DURATION_DAYS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_ganttline_home;

/// Narrowest and widest day columns the timeline will draw.
pub const MIN_DAY_WIDTH: f64 = 14.0;
pub const MAX_DAY_WIDTH: f64 = 30.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineSection,
    #[serde(default)]
    pub clock: ClockSection,
    #[serde(default)]
    pub projects: ProjectsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSection {
    /// Pixels per day column.
    pub day_width: f64,
    /// Inclusive length given to auto-chained tasks.
    pub default_duration_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSection {
    /// IANA name, e.g. "America/Chicago". Decides which calendar day "today" is.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectsSection {
    pub default_color: String,
}

impl Default for TimelineSection {
    fn default() -> Self {
        Self { day_width: 20.0, default_duration_days: DEFAULT_DURATION_DAYS }
    }
}

impl Default for ClockSection {
    fn default() -> Self {
        Self { timezone: "UTC".to_string() }
    }
}

impl Default for ProjectsSection {
    fn default() -> Self {
        Self { default_color: DEFAULT_PROJECT_COLOR.to_string() }
    }
}

/// Keep a requested zoom inside the range the timeline supports.
pub fn clamp_day_width(day_width: f64) -> f64 {
    if day_width.is_nan() {
        return TimelineSection::default().day_width;
    }
    day_width.clamp(MIN_DAY_WIDTH, MAX_DAY_WIDTH)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ganttline_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    println!("# {}", p.display());
    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.timeline.day_width, 20.0);
        assert_eq!(cfg.clock.timezone, "UTC");
    }

    #[test]
    fn partial_file_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[clock]\ntimezone = \"America/Chicago\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.clock.timezone, "America/Chicago");
        assert_eq!(cfg.timeline.default_duration_days, 2);
        assert_eq!(cfg.projects.default_color, "#111827");
    }

    #[test]
    fn defaults_survive_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(clamp_day_width(8.0), 14.0);
        assert_eq!(clamp_day_width(22.0), 22.0);
        assert_eq!(clamp_day_width(64.0), 30.0);
    }
}
