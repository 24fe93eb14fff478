use crate::discord::{ChannelId, DEFAULT_API_URL};
use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    pub channel_id: ChannelId,
    pub bind_address: String,
    pub discord_api_url: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, matching how .env files are usually written.
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let channel_id = get("CHANNEL_ID").ok_or(ConfigError::Missing("CHANNEL_ID"))?;
        let channel_id = channel_id
            .trim()
            .parse::<u64>()
            .map(ChannelId)
            .map_err(|e| ConfigError::Invalid {
                key: "CHANNEL_ID",
                message: e.to_string(),
            })?;

        let bind_address = match get("BIND_ADDRESS") {
            Some(addr) => addr,
            None => {
                let port = match get("PORT") {
                    Some(port) => port.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                        key: "PORT",
                        message: e.to_string(),
                    })?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{port}")
            }
        };

        let discord_api_url = get("DISCORD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());

        Ok(Self {
            discord_token,
            channel_id,
            bind_address,
            discord_api_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DISCORD_TOKEN", "secret"), ("CHANNEL_ID", "1234567890")]).unwrap();

        assert_eq!(
            config,
            Config {
                discord_token: "secret".into(),
                channel_id: ChannelId(1234567890),
                bind_address: "0.0.0.0:8080".into(),
                discord_api_url: DEFAULT_API_URL.into(),
            }
        );
    }

    #[test]
    fn test_port_and_bind_address() {
        let base = [("DISCORD_TOKEN", "secret"), ("CHANNEL_ID", "1")];

        let config = load(&[base[0], base[1], ("PORT", "3000")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");

        let config = load(&[base[0], base[1], ("PORT", "3000"), ("BIND_ADDRESS", "127.0.0.1:9000")])
            .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(
            load(&[("CHANNEL_ID", "1")]).unwrap_err(),
            ConfigError::Missing("DISCORD_TOKEN")
        );
        assert_eq!(
            load(&[("DISCORD_TOKEN", "secret"), ("CHANNEL_ID", "")]).unwrap_err(),
            ConfigError::Missing("CHANNEL_ID")
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("DISCORD_TOKEN", "secret"), ("CHANNEL_ID", "general")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "CHANNEL_ID", .. }));

        let err = load(&[("DISCORD_TOKEN", "secret"), ("CHANNEL_ID", "1"), ("PORT", "99999")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
