use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub data_dir: String,
    /// HMAC secret for access tokens. `None` disables token issuance.
    pub jwt_secret: Option<String>,
    pub access_token_ttl_hours: i64,
    pub allowed_origins: Vec<String>,
    pub bootstrap_username: Option<String>,
    pub bootstrap_password: Option<String>,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_DATA_DIR: &str = "./data";
    const DEFAULT_ACCESS_TOKEN_TTL_HOURS: i64 = 72;
    /// One year
    pub const MAX_ACCESS_TOKEN_TTL_HOURS: i64 = 24 * 365;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("AUTH0_CLIENT_SECRET").filter(|s| !s.is_empty());
        if jwt_secret.is_none() {
            warn!("AUTH0_CLIENT_SECRET not set, logins will fail until it is configured");
        }

        Self {
            host: lookup("PICKEM_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: lookup("PICKEM_HTTP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(Self::DEFAULT_HTTP_PORT),
            data_dir: lookup("PICKEM_DATA_DIR")
                .unwrap_or_else(|| Self::DEFAULT_DATA_DIR.to_string()),
            jwt_secret,
            access_token_ttl_hours: Self::access_token_ttl_hours(lookup("PICKEM_TOKEN_TTL_HOURS")),
            allowed_origins: lookup("PICKEM_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            bootstrap_username: lookup("PICKEM_BOOTSTRAP_USERNAME").filter(|s| !s.is_empty()),
            bootstrap_password: lookup("PICKEM_BOOTSTRAP_PASSWORD").filter(|s| !s.is_empty()),
        }
    }

    fn access_token_ttl_hours(value: Option<String>) -> i64 {
        let hours = value
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|hours| *hours > 0)
            .unwrap_or(Self::DEFAULT_ACCESS_TOKEN_TTL_HOURS);

        if hours > Self::MAX_ACCESS_TOKEN_TTL_HOURS {
            warn!(
                "PICKEM_TOKEN_TTL_HOURS={} exceeds the maximum, using {}",
                hours,
                Self::MAX_ACCESS_TOKEN_TTL_HOURS
            );
            return Self::MAX_ACCESS_TOKEN_TTL_HOURS;
        }
        hours
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, "./data");
        assert_eq!(config.access_token_ttl_hours, 72);
        assert!(config.jwt_secret.is_none());
        assert!(config.allows_any_origin());
        assert!(config.bootstrap_username.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PICKEM_HOST", "127.0.0.1"),
            ("PICKEM_HTTP_PORT", "9000"),
            ("AUTH0_CLIENT_SECRET", "s3cret"),
            ("PICKEM_TOKEN_TTL_HOURS", "1"),
            ("PICKEM_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("PICKEM_BOOTSTRAP_USERNAME", "admin"),
            ("PICKEM_BOOTSTRAP_PASSWORD", "admin12345"),
        ]);

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.access_token_ttl_hours, 1);
        assert_eq!(
            config.allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.bootstrap_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("PICKEM_HTTP_PORT", "not-a-port"),
            ("PICKEM_TOKEN_TTL_HOURS", "-5"),
            ("AUTH0_CLIENT_SECRET", ""),
        ]);

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.access_token_ttl_hours, 72);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_huge_token_ttl_is_clamped() {
        for value in ["100000000000", "9223372036854775807"] {
            let config = config_from(&[("PICKEM_TOKEN_TTL_HOURS", value)]);
            assert_eq!(
                config.access_token_ttl_hours,
                Config::MAX_ACCESS_TOKEN_TTL_HOURS
            );
        }
    }
}
