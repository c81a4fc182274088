use std::fs;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::JoinError;
use crate::identifier::KeyRule;
use crate::label::{DEFAULT_SEPARATOR, check_separator};

pub const DEFAULT_CONFIG_FILE: &str = "midori-join.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub taxon: Option<String>,
    #[serde(default)]
    pub fasta: Option<String>,
    #[serde(default)]
    pub normalize: Option<bool>,
    #[serde(default)]
    pub separator: Option<char>,
    #[serde(default)]
    pub key_rule: Option<KeyRule>,
    #[serde(default)]
    pub key_pattern: Option<String>,
    #[serde(default)]
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub taxon: Option<Utf8PathBuf>,
    pub fasta: Option<Utf8PathBuf>,
    pub normalize: bool,
    pub separator: char,
    pub key_rule: KeyRule,
    pub key_pattern: Option<String>,
    pub parallel: bool,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, JoinError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(JoinError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| JoinError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| JoinError::ConfigParse(err.to_string()))?;

        let base = Utf8PathBuf::from_path_buf(config_path.clone())
            .map_err(|_| JoinError::ConfigRead(config_path))?;
        let base_dir = base.parent().unwrap_or(Utf8Path::new(""));
        Self::resolve_config(config, base_dir)
    }

    pub fn resolve_config(
        config: Config,
        base_dir: &Utf8Path,
    ) -> Result<ResolvedConfig, JoinError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(JoinError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }
        if config.key_rule == Some(KeyRule::Pattern) && config.key_pattern.is_none() {
            return Err(JoinError::ConfigParse(
                "key_rule \"pattern\" requires key_pattern".to_string(),
            ));
        }

        let separator = config.separator.unwrap_or(DEFAULT_SEPARATOR);
        check_separator(separator)?;

        let resolve_path = |value: Option<String>| {
            value.map(|value| {
                let path = Utf8PathBuf::from(value);
                if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                }
            })
        };

        Ok(ResolvedConfig {
            schema_version,
            taxon: resolve_path(config.taxon),
            fasta: resolve_path(config.fasta),
            normalize: config.normalize.unwrap_or(true),
            separator,
            key_rule: config.key_rule.unwrap_or_default(),
            key_pattern: config.key_pattern,
            parallel: config.parallel.unwrap_or(false),
        })
    }
}
