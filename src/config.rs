use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confirm::DuplicatePolicy;
use crate::error::ScanError;
use crate::season::Season;
use crate::validate::MatchRules;

pub const CONFIG_FILE: &str = "scorescan.json";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub on_duplicate: Option<DuplicatePolicy>,
    #[serde(default)]
    pub max_match: Option<u32>,
    #[serde(default)]
    pub practice_match: Option<u32>,
    #[serde(default)]
    pub strict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub season: Season,
    pub on_duplicate: DuplicatePolicy,
    pub rules: MatchRules,
    pub strict: bool,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            season: Season::RoverRuckus,
            on_duplicate: DuplicatePolicy::Ask,
            rules: MatchRules::default(),
            strict: false,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ScanError> {
        let config_path = match path {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::discover(),
        };

        let Some(config_path) = config_path else {
            debug!("no config file found, using defaults");
            return Ok(ResolvedConfig::default());
        };

        debug!(path = %config_path.display(), "loading config");
        let content = fs::read_to_string(&config_path)
            .map_err(|_| ScanError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ScanError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ScanError> {
        let defaults = ResolvedConfig::default();
        let rules = MatchRules {
            max_match: config.max_match.unwrap_or(defaults.rules.max_match),
            practice_match: config.practice_match.unwrap_or(defaults.rules.practice_match),
        };
        if rules.max_match == 0 {
            return Err(ScanError::InvalidConfig(
                "max_match must be greater than zero".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(defaults.schema_version),
            season: config.season.unwrap_or(defaults.season),
            on_duplicate: config.on_duplicate.unwrap_or(defaults.on_duplicate),
            rules,
            strict: config.strict.unwrap_or(defaults.strict),
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        ProjectDirs::from("", "", "scorescan")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .filter(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let resolved = ConfigLoader::resolve_config(Config::default()).unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
        assert_eq!(resolved.rules.max_match, 200);
        assert_eq!(resolved.rules.practice_match, 999);
    }
}
