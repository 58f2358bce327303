use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path prefix every route is mounted under, e.g. `/news`
    pub prefix: String,
    /// Address the HTTP server binds to
    pub address: String,
    pub static_dir: PathBuf,
    /// SQLite file written by the crawler
    pub database: PathBuf,
    /// Number of articles on the front page
    pub items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            address: "0.0.0.0:5000".to_string(),
            static_dir: PathBuf::from("static"),
            database: PathBuf::from("news.sqlite"),
            items: 200,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()
    }

    /// Normalizes the prefix and rejects settings the server cannot use.
    pub fn validate(mut self) -> anyhow::Result<Self> {
        let trimmed = self.prefix.trim_end_matches('/').to_string();
        if !trimmed.is_empty() && !trimmed.starts_with('/') {
            anyhow::bail!("prefix must start with '/': {:?}", self.prefix);
        }
        if trimmed.contains(|c: char| c == '?' || c == '#') {
            anyhow::bail!("prefix must be a plain path: {:?}", self.prefix);
        }
        self.prefix = trimmed;
        Ok(self)
    }

    /// Joins the prefix with a route path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.prefix, path)
    }
}
