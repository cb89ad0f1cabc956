//! Plugin configuration as delivered by the host (`{ "addonDirectories": [...] }`).

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Addons directory used when none is configured, relative to the project root.
pub const DEFAULT_ADDONS_DIR: &str = "addons";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon_directories: Option<Vec<String>>,
}

impl Config {
    pub fn new(addon_directories: Vec<String>) -> Self {
        Self {
            addon_directories: Some(addon_directories),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Configured addon roots, defaulting to `<project_root>/addons`, each
    /// passed through the host's path resolution.
    pub fn addon_roots(&self, project_root: &str, resolve: impl Fn(&str) -> String) -> Vec<String> {
        match &self.addon_directories {
            Some(dirs) => dirs.iter().map(|dir| resolve(dir)).collect(),
            None => vec![resolve(&format!(
                "{}/{}",
                project_root.trim_end_matches('/'),
                DEFAULT_ADDONS_DIR
            ))],
        }
    }
}

/// Elements of `previous` missing from `next`.
pub fn removed_roots(previous: &[String], next: &[String]) -> Vec<String> {
    previous
        .iter()
        .filter(|root| !next.contains(root))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = Config::from_json(r#"{"addonDirectories": ["a", "/b"]}"#).unwrap();
        assert_eq!(config, Config::new(vec!["a".to_string(), "/b".to_string()]));

        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::from_json("").unwrap(), Config::default());
        assert!(Config::from_json("[1]").is_err());
    }

    #[test]
    fn test_default_root_under_project() {
        let roots = Config::default().addon_roots("/work/", |p| p.to_string());
        assert_eq!(roots, vec!["/work/addons".to_string()]);
    }

    #[test]
    fn test_roots_are_resolved() {
        let config = Config::new(vec!["odoo/addons".to_string()]);
        let roots = config.addon_roots("/work", |p| format!("/work/{p}"));
        assert_eq!(roots, vec!["/work/odoo/addons".to_string()]);
    }

    #[test]
    fn test_removed_roots() {
        let previous = vec!["/a".to_string(), "/b".to_string()];
        let next = vec!["/b".to_string(), "/c".to_string()];
        assert_eq!(removed_roots(&previous, &next), vec!["/a".to_string()]);
        assert!(removed_roots(&next, &next).is_empty());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&Config::new(vec!["x".to_string()])).unwrap();
        assert_eq!(json, r#"{"addonDirectories":["x"]}"#);
    }
}
