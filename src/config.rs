use crate::prelude::*;
use clap::ValueEnum;
use directories::UserDirs;
use ec2_model::model::API_VERSION;
use serde::{Deserialize, Serialize};
use std::env::var;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "ec2-model.config.json";
pub const DEFAULT_CONFIG: &str = include_str!("../ec2-model.config.json");

#[derive(Serialize, Deserialize, ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendering plus Query parameters
    #[default]
    Text,
    /// JSON members
    Json,
    /// The HTTP request as it would be sent
    Http,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint template, `{region}` is substituted.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_endpoint() -> String {
    "https://ec2.{region}.amazonaws.com/".to_string()
}

impl Config {
    pub fn user_dirs() -> Result<UserDirs> {
        UserDirs::new().ok_or_else(|| eyre!("can't get user dirs"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::user_dirs()?.home_dir().join(".config").join("ec2-model"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Reads `path`, or the user config (written from the defaults on first
    /// run), then applies the region from the environment.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let config_path = Self::config_path()?;
                if !config_path.exists() {
                    std::fs::create_dir_all(Self::config_dir()?)?;
                    std::fs::write(&config_path, DEFAULT_CONFIG)?;
                }
                config_path
            }
        };
        let json = std::fs::read_to_string(&config_path).wrap_err(f!("can't find config: {config_path:?}"))?;
        let config = Self::parse(&json)?.with_region(env_region());
        tracing::debug!(path = ?config_path, region = %config.region, "loaded config");
        Ok(config)
    }

    pub fn parse(json: &str) -> Result<Config> {
        serde_json::from_str(json).wrap_err("Error deserializing config")
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        if let Some(region) = region.not_empty() {
            self.region = region;
        }
        self
    }

    pub fn endpoint_url(&self) -> String {
        self.endpoint.replace("{region}", &self.region)
    }

    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().filter(|v| !v.is_empty()).unwrap_or(API_VERSION)
    }
}

fn env_region() -> Option<String> {
    var("AWS_REGION").ok().not_empty().or_else(|| var("AWS_DEFAULT_REGION").ok())
}
