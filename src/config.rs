//! Configuration Management
//!
//! Persistent user defaults for crdeploy plus the settings a
//! [`Deployer`](crate::run::deployer::Deployer) is constructed from.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Project override applied to every manifest
    #[serde(default)]
    pub project_id: Option<String>,
    /// Cloud Run region
    #[serde(default)]
    pub region: Option<String>,
    /// API endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("crdeploy").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                Self::default()
            },
        }
    }

    fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config file: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective project override (CLI > config)
    ///
    /// Deliberately never falls back to the gcloud default project: an empty
    /// override means the manifest namespace names the project.
    pub fn effective_project(&self, cli: Option<&str>) -> String {
        cli.map(|s| s.to_string())
            .or_else(|| self.project_id.clone())
            .unwrap_or_default()
    }

    /// Get effective region (CLI > config > gcloud default)
    pub fn effective_region(&self, cli: Option<&str>) -> Option<String> {
        cli.map(|s| s.to_string())
            .or_else(|| self.region.clone())
            .or_else(crate::gcp::auth::get_default_region)
    }

    /// Get effective endpoint override (CLI > config)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Option<String> {
        cli.map(|s| s.to_string()).or_else(|| self.endpoint.clone())
    }
}

/// Options used when constructing a Cloud Run client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// Replaces the regional `https://{region}-run.googleapis.com` endpoint
    pub endpoint: Option<String>,
    /// Use this bearer token instead of Application Default Credentials
    pub access_token: Option<String>,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_token: None,
            user_agent: format!("crdeploy/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    pub fn endpoint_for(&self, region: &str) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}-run.googleapis.com", region),
        }
    }
}

/// Static settings of a deployer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployConfig {
    pub config_name: String,
    /// Project override; empty means "use the manifest namespace"
    pub project: String,
    pub region: String,
    pub client_options: ClientOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_wins_over_config() {
        let config = Config {
            project_id: Some("from-config".to_string()),
            region: Some("europe-west1".to_string()),
            endpoint: None,
        };
        assert_eq!(config.effective_project(Some("from-cli")), "from-cli");
        assert_eq!(config.effective_project(None), "from-config");
        assert_eq!(
            config.effective_region(Some("us-east1")).as_deref(),
            Some("us-east1")
        );
        assert_eq!(
            config.effective_region(None).as_deref(),
            Some("europe-west1")
        );
    }

    #[test]
    fn test_empty_project_override_by_default() {
        assert_eq!(Config::default().effective_project(None), "");
    }

    #[test]
    fn test_parse_tolerates_garbage() {
        assert_eq!(Config::parse("not json"), Config::default());
        let config = Config::parse(r#"{"region": "asia-east1"}"#);
        assert_eq!(config.region.as_deref(), Some("asia-east1"));
        assert_eq!(config.project_id, None);
    }

    #[test]
    fn test_endpoint_for_region() {
        let options = ClientOptions::default();
        assert_eq!(
            options.endpoint_for("us-central1"),
            "https://us-central1-run.googleapis.com"
        );
        let options = ClientOptions {
            endpoint: Some("http://localhost:9999".to_string()),
            ..ClientOptions::default()
        };
        assert_eq!(options.endpoint_for("us-central1"), "http://localhost:9999");
    }
}
