use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

pub const PUBLIC_DIR: &str = "public";

const CONFIG_DIR: &str = ".subcap";

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    // same-named inputs collide, first one wins
    #[default]
    Flat,
    Mirror,
}

#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum ConfidenceMode {
    #[default]
    Random,
    Fixed(f64),
}

impl ConfidenceMode {
    pub fn fixed(value: f64) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("confidence must be between 0 and 1, got {}", value);
        }
        Ok(ConfidenceMode::Fixed(value))
    }
}

impl<'de> Deserialize<'de> for ConfidenceMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Value(f64),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Value(v) => ConfidenceMode::fixed(v).map_err(serde::de::Error::custom),
            Raw::Name(name) if name == "random" => Ok(ConfidenceMode::Random),
            Raw::Name(name) => Err(serde::de::Error::custom(format!(
                "unknown confidence mode {:?}, expected \"random\" or a number",
                name
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub output_dir: Option<PathBuf>,
    pub layout: Option<Layout>,
    pub confidence: Option<ConfidenceMode>,
}

impl AppConfig {
    pub fn merge(self, other: AppConfig) -> AppConfig {
        AppConfig {
            output_dir: other.output_dir.or(self.output_dir),
            layout: other.layout.or(self.layout),
            confidence: other.confidence.or(self.confidence),
        }
    }

    pub fn into_settings(self, root: PathBuf) -> Settings {
        let output_dir = match self.output_dir {
            Some(dir) => root.join(dir),
            None => root.join(PUBLIC_DIR),
        };

        Settings {
            root,
            output_dir,
            layout: self.layout.unwrap_or_default(),
            confidence: self.confidence.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub layout: Layout,
    pub confidence: ConfidenceMode,
}

impl Settings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        AppConfig::default().into_settings(root.into())
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn default_input_dir(&self) -> PathBuf {
        self.root.join(PUBLIC_DIR)
    }
}

pub fn resolve_profile_path(profile: &str) -> anyhow::Result<PathBuf> {
    if let Some(rest) = profile.strip_prefix("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(rest));
    }

    let path = PathBuf::from(profile);
    if path.is_absolute() || profile.starts_with("./") || profile.starts_with("../") {
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home
        .join(CONFIG_DIR)
        .join("profiles")
        .join(format!("{}.yaml", profile)))
}

/// Loads `~/.subcap/config.yaml`, or the defaults when there is none.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let Some(home) = dirs::home_dir() else {
        log::debug!("no home directory, using default config");
        return Ok(AppConfig::default());
    };

    let config_path = home.join(CONFIG_DIR).join("config.yaml");
    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    load_config_file(&config_path)
}

pub fn load_config_file(path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    log::debug!("loaded config from {:?}: {:?}", path, config);
    Ok(config)
}
