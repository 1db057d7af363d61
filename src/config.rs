//! Runtime settings for the report pipeline.
//!
//! Settings come from a JSON file when one is given, otherwise from the
//! environment (after `.env` has been loaded by the binary):
//!
//! | Variable                       | Default |
//! |--------------------------------|---------|
//! | `FLEET_API_URL`                | none    |
//! | `FLEET_MULTI_DEPENDENCY_GROUP` | `16`    |
//! | `FLEET_HTTP_TIMEOUT_SECS`      | `30`    |

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::fetch::DatasetPaths;
use crate::report::classify::{Classifier, MULTI_DEPENDENCY_GROUP};
use crate::report::rank::TOP_ALERTS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub api_url: Option<String>,
    pub multi_dependency_group: i64,
    pub http_timeout_secs: u64,
    pub top_alerts: usize,
    pub paths: DatasetPaths,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            multi_dependency_group: MULTI_DEPENDENCY_GROUP,
            http_timeout_secs: 30,
            top_alerts: TOP_ALERTS,
            paths: DatasetPaths::default(),
        }
    }
}

impl ReportSettings {
    /// Loads settings from a JSON file at `path`; missing keys take defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{path}'"))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file '{path}'"))?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        settings.api_url = lookup("FLEET_API_URL").filter(|url| !url.is_empty());

        if let Some(group) = lookup("FLEET_MULTI_DEPENDENCY_GROUP") {
            settings.multi_dependency_group = group
                .parse()
                .with_context(|| format!("FLEET_MULTI_DEPENDENCY_GROUP is not an integer: '{group}'"))?;
        }

        if let Some(secs) = lookup("FLEET_HTTP_TIMEOUT_SECS") {
            settings.http_timeout_secs = secs
                .parse()
                .with_context(|| format!("FLEET_HTTP_TIMEOUT_SECS is not a number: '{secs}'"))?;
        }

        Ok(settings)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::with_group(self.multi_dependency_group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let settings = ReportSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ReportSettings::default());
        assert_eq!(settings.multi_dependency_group, 16);
        assert_eq!(settings.top_alerts, 5);
    }

    #[test]
    fn test_env_overrides() {
        let settings = ReportSettings::from_lookup(lookup(&[
            ("FLEET_API_URL", "https://fleet.example.com/api"),
            ("FLEET_MULTI_DEPENDENCY_GROUP", "21"),
            ("FLEET_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(settings.api_url.as_deref(), Some("https://fleet.example.com/api"));
        assert_eq!(settings.classifier().multi_dependency_group, 21);
        assert_eq!(settings.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_group_is_rejected() {
        let result = ReportSettings::from_lookup(lookup(&[("FLEET_MULTI_DEPENDENCY_GROUP", "abc")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_json_settings() {
        let settings: ReportSettings =
            serde_json::from_str(r#"{"api_url": "http://localhost:8082", "paths": {"devices": "api/devices"}}"#)
                .unwrap();

        assert_eq!(settings.api_url.as_deref(), Some("http://localhost:8082"));
        assert_eq!(settings.paths.devices, "api/devices");
        assert_eq!(settings.paths.events, "reports/events");
        assert_eq!(settings.multi_dependency_group, 16);
    }
}
