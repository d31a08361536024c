//! CLI Configuration

use anyhow::{bail, Context as _, Result};
use connecta_forms::FormsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_format: Option<String>,
    pub forms: FormsConfig,
    #[serde(skip)]
    profile: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        let path = Self::config_path(profile)?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str::<Config>(&content).with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            Self::default()
        };
        config.profile = profile.map(String::from);
        Ok(config)
    }

    /// Empty configuration bound to `profile`.
    pub fn for_profile(profile: Option<&str>) -> Self {
        Self {
            profile: profile.map(String::from),
            ..Self::default()
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path(self.profile.as_deref())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Drafts go to the configured directory, else `~/.connecta/drafts`.
    pub fn draft_dir(&self) -> Result<PathBuf> {
        match &self.forms.draft_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::base_dir()?.join("drafts")),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let forms = &mut self.forms;
        match key {
            "api_url" => forms.api_url = value.to_string(),
            "draft_dir" => forms.draft_dir = Some(PathBuf::from(value)),
            "timeout_secs" => forms.timeout_secs = number(key, value)?,
            "import_batch_size" => forms.import_batch_size = number(key, value)?,
            "suggestions.min_chars" => forms.suggestions.min_chars = number(key, value)?,
            "suggestions.limit" => forms.suggestions.limit = number(key, value)?,
            "suggestions.debounce_ms" => forms.suggestions.debounce_ms = number(key, value)?,
            "default_format" => self.default_format = Some(value.to_string()),
            other => {
                let Some((flow, bound)) = other
                    .strip_prefix("age_ranges.")
                    .and_then(|rest| rest.split_once('.'))
                else {
                    bail!("Unknown config key: {}", key);
                };
                let ranges = &mut forms.age_ranges;
                let range = match flow {
                    "attendee" => &mut ranges.attendee,
                    "tournament" => &mut ranges.tournament,
                    "exhibition" => &mut ranges.exhibition,
                    _ => bail!("Unknown flow in config key: {}", key),
                };
                match bound {
                    "min" => range.min = number(key, value)?,
                    "max" => range.max = number(key, value)?,
                    _ => bail!("Unknown config key: {}", key),
                }
            }
        }
        self.forms.validate()?;
        Ok(())
    }

    fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Cannot find home directory")?;
        Ok(home.join(".connecta"))
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(Self::base_dir()?.join(filename))
    }
}

/// Parse into the field's own integer type so out-of-range input is an error.
fn number<T: FromStr<Err = ParseIntError>>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .with_context(|| format!("{} expects a number in range", key))
}
