use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;
use tracing::{debug, warn};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "pimx";
const DEFAULT_CUSTOM_ADDRESS_LABEL: &str = "Holiday address";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File the settings came from; `None` when running on defaults.
    pub config_path: Option<PathBuf>,
    pub phone_region: Option<String>,
    /// Label given to the primary address by the demo modification step.
    pub custom_address_label: String,
    /// vCard file used to seed the demo list when `--seed` is absent.
    pub seed: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            phone_region: None,
            custom_address_label: DEFAULT_CUSTOM_ADDRESS_LABEL.to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    phone_region: Option<String>,
    custom_address_label: Option<String>,
    seed: Option<PathBuf>,
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load settings from `explicit`, or from the default location.
///
/// A missing default file yields the defaults; a missing explicit file is an
/// error.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                debug!(path = %path.display(), "no configuration file, using defaults");
                return Ok(Config::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    let mut config = parse(&raw).with_context(|| format!("failed to load {}", path.display()))?;

    // Relative seed paths are resolved against the config file's directory.
    if let (Some(seed), Some(dir)) = (config.seed.as_mut(), path.parent()) {
        if seed.is_relative() {
            *seed = dir.join(&*seed);
        }
    }
    config.config_path = Some(path);
    Ok(config)
}

fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    let phone_region = cfg_file
        .phone_region
        .as_ref()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_ascii_uppercase());

    let custom_address_label = cfg_file
        .custom_address_label
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CUSTOM_ADDRESS_LABEL.to_string());

    Ok(Config {
        config_path: None,
        phone_region,
        custom_address_label,
        seed: cfg_file.seed,
    })
}

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["phone_region", "custom_address_label", "seed"]);

    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warn!("unknown configuration key `{}`", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.custom_address_label, "Holiday address");
    }

    #[test]
    fn test_parse_normalizes_values() {
        let config = parse(
            r#"
phone_region = " gb "
custom_address_label = "  Summer house "
seed = "contacts.vcf"
"#,
        )
        .unwrap();

        assert_eq!(config.phone_region.as_deref(), Some("GB"));
        assert_eq!(config.custom_address_label, "Summer house");
        assert_eq!(config.seed, Some(PathBuf::from("contacts.vcf")));
    }

    #[test]
    fn test_parse_blank_values_fall_back() {
        let config = parse("phone_region = \"\"\ncustom_address_label = \" \"\n").unwrap();
        assert_eq!(config.phone_region, None);
        assert_eq!(config.custom_address_label, "Holiday address");
    }

    #[test]
    fn test_parse_tolerates_unknown_keys() {
        let config = parse("colour = \"blue\"\nphone_region = \"us\"\n").unwrap();
        assert_eq!(config.phone_region.as_deref(), Some("US"));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(parse("phone_region = 44\n").is_err());
        assert!(parse("not toml at all [").is_err());
    }

    #[test]
    fn test_load_explicit_file_resolves_relative_seed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pimx.toml");
        fs::write(&path, "seed = \"cards/people.vcf\"\n").unwrap();

        let config = load(Some(&path)).unwrap();

        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.seed, Some(temp.path().join("cards/people.vcf")));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("configuration file not found"));
    }
}
