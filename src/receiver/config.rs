use thiserror::Error;
use vbot_dispatcher::messages::DEFAULT_USAGE_URL;

use crate::credentials::BlobLocation;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("DEPLOY_KEY_BUCKET and DEPLOY_KEY_OBJECT must be set together")]
    PartialDeployKeyLocation,
}

/// Settings read once per cold start.
#[derive(Debug, Clone)]
pub struct Config {
    pub signing_secret: String,
    pub bot_token: Option<String>,
    pub usage_url: String,
    pub deploy_key: Option<BlobLocation>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset; Lambda consoles make it easy to leave one empty.
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_secret =
            get("SLACK_SIGNING_SECRET").ok_or(ConfigError::Missing("SLACK_SIGNING_SECRET"))?;

        let deploy_key = match (get("DEPLOY_KEY_BUCKET"), get("DEPLOY_KEY_OBJECT")) {
            (Some(bucket), Some(key)) => Some(BlobLocation { bucket, key }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialDeployKeyLocation),
        };

        Ok(Self {
            signing_secret,
            bot_token: get("SLACK_BOT_TOKEN"),
            usage_url: get("VBOT_USAGE_URL").unwrap_or_else(|| DEFAULT_USAGE_URL.to_string()),
            deploy_key,
        })
    }
}
