//! Configuration management
//!
//! Settings live in `settings.json` inside the chirp directory:
//! ```json
//! {
//!   "feed": { "pageSize": 30 },
//!   "relationships": { "selfFollow": "ignore" },
//!   "credentials": { "timeCost": 2, "memoryCost": 19456, "parallelism": 1 }
//! }
//! ```
//! Keys this crate does not manage are kept when saving.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{Argon2Params, SelfFollowPolicy};
use crate::services::DEFAULT_PAGE_SIZE;

pub const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    feed: FeedSettings,
    #[serde(default)]
    relationships: RelationshipSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<Argon2Params>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedSettings {
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationshipSettings {
    #[serde(default)]
    self_follow: Option<SelfFollowPolicy>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Chirp configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub feed_page_size: usize,
    pub self_follow: SelfFollowPolicy,
    pub argon2: Argon2Params,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_page_size: DEFAULT_PAGE_SIZE,
            self_follow: SelfFollowPolicy::default(),
            argon2: Argon2Params::default(),
        }
    }
}

impl Config {
    /// Load config from the chirp directory
    ///
    /// Environment variables take precedence over the settings file:
    /// - CHIRP_FEED_PAGE_SIZE
    /// - CHIRP_SELF_FOLLOW (`ignore` or `allow`)
    pub fn load(chirp_dir: &Path) -> Result<Self> {
        let raw = read_settings(chirp_dir)?;

        let feed_page_size = match std::env::var("CHIRP_FEED_PAGE_SIZE").ok() {
            Some(value) => parse_page_size(&value)?,
            None => raw.feed.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        };
        if feed_page_size == 0 {
            bail!("feed page size must be at least 1");
        }

        let self_follow = match std::env::var("CHIRP_SELF_FOLLOW").ok() {
            Some(value) => match SelfFollowPolicy::parse(&value) {
                Some(policy) => policy,
                None => bail!("Invalid CHIRP_SELF_FOLLOW value: {}", value),
            },
            None => raw.relationships.self_follow.unwrap_or_default(),
        };

        Ok(Self {
            feed_page_size,
            self_follow,
            argon2: raw.credentials.unwrap_or_default(),
        })
    }

    /// Save config to the chirp directory
    /// Preserves other settings that chirp doesn't manage
    pub fn save(&self, chirp_dir: &Path) -> Result<()> {
        let mut settings = read_settings(chirp_dir)?;

        settings.feed.page_size = Some(self.feed_page_size);
        settings.relationships.self_follow = Some(self.self_follow);
        if self.argon2 != Argon2Params::default() {
            settings.credentials = Some(self.argon2);
        }

        std::fs::create_dir_all(chirp_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(chirp_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn read_settings(chirp_dir: &Path) -> Result<SettingsFile> {
    let settings_path = chirp_dir.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)?;
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn parse_page_size(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(size) => Ok(size),
        Err(_) => bail!("Invalid CHIRP_FEED_PAGE_SIZE value: {}", value),
    }
}
