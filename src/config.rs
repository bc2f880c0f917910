//! Manifest loading
//!
//! A manifest is a TOML file with an optional `[connection]` table and a
//! list of `[[resource]]` tables tagged by `kind`.

use anyhow::{Context, Result, bail};
use declarative::ExecutionPlan;
use jirakit::ConnectionSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource::ResourceSpec;

/// Default manifest file name
pub const MANIFEST_FILE: &str = "jiraform.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("jiraform"))
}

/// A parsed manifest
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceSpec>,
}

impl Manifest {
    /// Parse a manifest from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a manifest from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {}", path.display()))
    }

    /// Build an execution plan in declaration order
    pub fn plan(&self) -> ExecutionPlan {
        let mut plan = ExecutionPlan::new();
        for spec in &self.resources {
            plan.add_resource(spec.clone().into_resource());
        }
        plan
    }
}

/// Find the manifest to use.
///
/// An explicit path must exist. Otherwise `./jiraform.toml` is tried, then
/// `~/.config/jiraform/jiraform.toml`.
pub fn find_manifest(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("Manifest not found: {}", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let local = PathBuf::from(MANIFEST_FILE);
    if local.is_file() {
        return Ok(local);
    }

    let global = config_dir()?.join(MANIFEST_FILE);
    if global.is_file() {
        return Ok(global);
    }

    bail!(
        "No manifest found. Create ./{MANIFEST_FILE} or {}",
        global.display()
    )
}

/// Manifest connection settings, if a manifest can be found.
///
/// Used by commands that do not otherwise need a manifest.
pub fn ambient_connection() -> ConnectionSettings {
    find_manifest(None)
        .and_then(|path| Manifest::load(&path))
        .map(|manifest| manifest.connection)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[connection]
url = "https://jira.example.com"
timeout = 30

[[resource]]
kind = "group"
group_name = "developers"

[[resource]]
kind = "project"
key = "PRJ1"
name = "Project One"
lead = "alice"
project_type_key = "software"
state = "present"

[[resource]]
kind = "project_role_membership"
project_key = "PRJ1"
role = "Developers"
groups = ["developers"]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.connection.url.as_deref(), Some("https://jira.example.com"));
        assert_eq!(manifest.connection.timeout, Some(30.0));
        assert!(manifest.connection.username.is_none());
        assert_eq!(manifest.resources.len(), 3);

        let plan = manifest.plan();
        let ids: Vec<String> = plan.resources.iter().map(|r| r.id()).collect();
        assert_eq!(
            ids,
            vec!["group.developers", "project.PRJ1", "project_role_membership.PRJ1.Developers"]
        );
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();
        assert!(manifest.resources.is_empty());
        assert_eq!(manifest.connection, ConnectionSettings::default());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = Manifest::parse("[[resource]]\nkind = \"board\"\nname = \"x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("board"));
    }

    #[test]
    fn test_load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[resource]]\nkind = \"group\"").unwrap();

        let err = Manifest::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid manifest"));
    }

    #[test]
    fn test_explicit_manifest_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(find_manifest(Some(missing.as_path())).is_err());

        let present = dir.path().join(MANIFEST_FILE);
        fs::write(&present, SAMPLE).unwrap();
        assert_eq!(find_manifest(Some(present.as_path())).unwrap(), present);
    }
}
