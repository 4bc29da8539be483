/// `load_config` module: Loads a static YAML config and merges in environment overrides and secrets.
///
/// This is the only place where the user-supplied YAML is parsed.
///
/// # Responsibilities
/// - Parse the YAML file into typed sections
/// - Apply `ELASTIC_SEARCH_URL` over the file's `url`, and pick up the optional
///   `ELASTIC_SEARCH_API_KEY` secret (never read from the file)
/// - Produce clear diagnostics: read failures, parse failures and a missing
///   backend URL each get their own message
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::es_store::EsConfig;

pub const URL_ENV: &str = "ELASTIC_SEARCH_URL";
pub const API_KEY_ENV: &str = "ELASTIC_SEARCH_API_KEY";

pub const DEFAULT_INDEX_PREFIX: &str = "regcore";
pub const DEFAULT_SEARCH_SIZE: usize = 100;

/// Fully merged configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub elasticsearch: EsConfig,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    elasticsearch: ElasticSearchSection,
}

#[derive(Debug, Deserialize)]
struct ElasticSearchSection {
    #[serde(default)]
    url: Option<String>,
    #[serde(default = "default_index_prefix")]
    index_prefix: String,
    #[serde(default = "default_search_size")]
    search_size: usize,
}

fn default_index_prefix() -> String {
    DEFAULT_INDEX_PREFIX.to_string()
}

fn default_search_size() -> usize {
    DEFAULT_SEARCH_SIZE
}

/// Loads a static YAML config file (no secrets) and injects env overrides and secrets.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let raw: RawConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => conf,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    let url = match std::env::var(URL_ENV) {
        Ok(url) if !url.is_empty() => {
            info!(url = %url, "{URL_ENV} found in env, overriding config file");
            url
        }
        _ => match raw.elasticsearch.url {
            Some(url) if !url.is_empty() => url,
            _ => {
                error!("No elasticsearch.url in config and {URL_ENV} not set");
                anyhow::bail!("No elasticsearch.url in config file and {URL_ENV} is not set");
            }
        },
    };

    let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
    info!(api_key_set = api_key.is_some(), "Checked env for {API_KEY_ENV}");

    if raw.elasticsearch.search_size == 0 {
        anyhow::bail!("elasticsearch.search_size must be greater than zero");
    }

    let elasticsearch = EsConfig {
        url,
        index_prefix: raw.elasticsearch.index_prefix,
        search_size: raw.elasticsearch.search_size,
        api_key,
    };

    info!(
        url = %elasticsearch.url,
        index_prefix = %elasticsearch.index_prefix,
        search_size = elasticsearch.search_size,
        "Config loaded and merged successfully"
    );

    Ok(CliConfig { elasticsearch })
}
