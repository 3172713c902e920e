//! Process configuration, read once from the environment at startup.

use std::{fmt, net::SocketAddr};

use anyhow::{bail, Context, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone)]
pub struct Config {
    /// `None` is a valid state: requests then take the missing-credential path.
    pub api_key: Option<String>,
    pub model_name: String,
    pub timeout_seconds: u64,
    pub max_output_tokens: u32,
    /// Provider root without the trailing `/chat/completions`.
    pub base_url: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout_seconds: u64 = match get("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("OPENAI_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_seconds == 0 {
            bail!("OPENAI_TIMEOUT_SECS must be greater than zero");
        }

        let max_output_tokens: u32 = match get("OPENAI_MAX_TOKENS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("OPENAI_MAX_TOKENS is not a number: {raw}"))?,
            None => DEFAULT_MAX_TOKENS,
        };
        if max_output_tokens == 0 {
            bail!("OPENAI_MAX_TOKENS must be greater than zero");
        }

        let addr = get("ANALYZER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let bind_addr = addr
            .parse()
            .with_context(|| format!("ANALYZER_ADDR is not a socket address: {addr}"))?;

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            model_name: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_seconds,
            max_output_tokens,
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            bind_addr,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_output_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("base_url", &self.base_url)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.model_name, "gpt-4o");
        assert_eq!(config.timeout_seconds, 30);
        assert_eq!(config.max_output_tokens, 1000);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert!(!config.has_credential());
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_TIMEOUT_SECS", "5"),
            ("OPENAI_MAX_TOKENS", "256"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("ANALYZER_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model_name, "gpt-4o-mini");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.max_output_tokens, 256);
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(config_from(&[("OPENAI_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("OPENAI_TIMEOUT_SECS", "0")]).is_err());
        assert!(config_from(&[("OPENAI_MAX_TOKENS", "0")]).is_err());
        assert!(config_from(&[("ANALYZER_ADDR", "not-an-addr")]).is_err());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
