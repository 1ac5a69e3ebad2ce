//! Configuration loading for reviewlab.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> environment. Configuration is loaded from
//! `~/.config/reviewlab/config.toml` and/or `.reviewlab/config.toml` in the
//! workspace directory. Service credentials always travel inside these
//! structs; nothing in the crate reads ambient session state.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::pipeline::PrepareOptions;
use crate::remote::hosting::DeploymentConfig;
use crate::remote::training::Hyperparameters;

/// Connection settings for one managed service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the service API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Optional bearer token sent with every request.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Top-level configuration for the reviewlab tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Managed service connection settings.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Dataset preparation options.
    #[serde(default)]
    pub prepare: PrepareOptions,
    /// Training hyperparameters.
    #[serde(default)]
    pub training: Hyperparameters,
    /// Endpoint deployment sizing.
    #[serde(default)]
    pub deploy: DeploymentConfig,
}

/// Load configuration with the standard layering.
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<AppConfig>,
) -> Result<AppConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "reviewlab", "reviewlab") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".reviewlab").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (REVIEWLAB_SERVICE__ENDPOINT, REVIEWLAB_PREPARE__SPLIT_RATIO, etc.)
    figment = figment.merge(Env::prefixed("REVIEWLAB_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    figment.extract().map_err(Box::new)
}

/// Load configuration from one explicit file, layered over defaults and
/// under the environment. Used when a config path is passed on the
/// command line.
pub fn load_config_from(path: &Path) -> Result<AppConfig, Box<figment::Error>> {
    Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REVIEWLAB_").split("__"))
        .extract()
        .map_err(Box::new)
}
