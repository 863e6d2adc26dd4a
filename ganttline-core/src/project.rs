//! Projects own tasks. Deleting one cascades to its tasks.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// slate-900
pub const DEFAULT_PROJECT_COLOR: &str = "#111827";

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: DEFAULT_PROJECT_COLOR.to_string(),
            created_at: created_at.into(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Trim a project name and reject it if nothing is left.
pub fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Missing("name"));
    }
    Ok(name.to_string())
}

/// Accept `#rgb` or `#rrggbb`.
pub fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    if !COLOR_RE.is_match(color) {
        return Err(Error::InvalidColor(color.to_string()));
    }
    Ok(color.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }

    pub fn apply_to(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(color) = &self.color {
            project.color = color.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_uses_default_color() {
        let p = Project::new("p1", "Intern Prep", "2026-01-01T00:00:00+00:00");
        assert_eq!(p.color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(normalize_name("  EECS 151  ").unwrap(), "EECS 151");
        assert!(matches!(normalize_name("   "), Err(Error::Missing("name"))));
    }

    #[test]
    fn colors_must_be_hex() {
        assert_eq!(validate_color("#0f172a").unwrap(), "#0f172a");
        assert_eq!(validate_color("#FFF").unwrap(), "#FFF");
        assert!(validate_color("slate").is_err());
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn patch_renames_in_place() {
        let mut p = Project::new("p1", "Old", "2026-01-01T00:00:00+00:00");
        ProjectPatch { name: Some("New".into()), color: None }.apply_to(&mut p);
        assert_eq!(p.name, "New");
        assert_eq!(p.color, DEFAULT_PROJECT_COLOR);
    }
}
