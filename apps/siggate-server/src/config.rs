//! Gateway configuration.
//!
//! All configuration is driven by environment variables.

use anyhow::{Context, Result, bail};

use siggate_core::policy::DEFAULT_REQUEST_LIFETIME;

/// Gateway configuration read from the environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address for the gateway.
    pub gateway_listen: String,
    /// Log level filter.
    pub log_level: String,
    /// Registered `(key_id, secret)` pairs.
    pub keys: Vec<(String, String)>,
    /// Headers every accepted signature must cover.
    pub required_headers: Vec<String>,
    /// Freshness window in seconds; `None` disables the check.
    pub request_lifetime: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:8686".to_owned(),
            log_level: "info".to_owned(),
            keys: Vec::new(),
            required_headers: vec!["date".to_owned()],
            request_lifetime: Some(DEFAULT_REQUEST_LIFETIME),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SIGGATE_KEYS` or `REQUEST_LIFETIME` cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("SIGGATE_KEYS") {
            config.keys = parse_key_entries(&v)?;
        }
        if let Ok(v) = std::env::var("REQUIRED_HEADERS") {
            config.required_headers = parse_header_list(&v);
        }
        if let Ok(v) = std::env::var("REQUEST_LIFETIME") {
            config.request_lifetime = parse_lifetime(&v)?;
        }

        Ok(config)
    }
}

/// Parse a comma-separated list of `keyId:secret` entries.
pub fn parse_key_entries(raw: &str) -> Result<Vec<(String, String)>> {
    let mut keys = Vec::new();

    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let Some((key_id, secret)) = entry.split_once(':') else {
            bail!("invalid SIGGATE_KEYS entry (expected keyId:secret): {entry}");
        };
        if key_id.is_empty() || secret.is_empty() {
            bail!("invalid SIGGATE_KEYS entry (empty key ID or secret): {entry}");
        }

        keys.push((key_id.to_owned(), secret.to_owned()));
    }

    Ok(keys)
}

/// Parse a comma-separated header list, lowercasing each name.
///
/// An empty input falls back to the default of `date`.
pub fn parse_header_list(raw: &str) -> Vec<String> {
    let headers: Vec<String> = raw
        .split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    if headers.is_empty() {
        vec!["date".to_owned()]
    } else {
        headers
    }
}

/// Parse the freshness window. `none`, `off`, and `0` disable the check.
pub fn parse_lifetime(raw: &str) -> Result<Option<u64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Some(DEFAULT_REQUEST_LIFETIME));
    }
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("off") || trimmed == "0"
    {
        return Ok(None);
    }

    let seconds: u64 = trimmed
        .parse()
        .with_context(|| format!("invalid REQUEST_LIFETIME value: {trimmed}"))?;
    Ok(Some(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_create_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.gateway_listen, "0.0.0.0:8686");
        assert_eq!(config.required_headers, vec!["date".to_owned()]);
        assert_eq!(config.request_lifetime, Some(300));
        assert!(config.keys.is_empty());
    }

    #[test]
    fn test_should_parse_key_entries() {
        let keys = parse_key_entries("client-1:s3cr3t, client-2:t0ps3cr3t").unwrap();
        assert_eq!(
            keys,
            vec![
                ("client-1".to_owned(), "s3cr3t".to_owned()),
                ("client-2".to_owned(), "t0ps3cr3t".to_owned()),
            ]
        );
    }

    #[test]
    fn test_should_keep_colons_inside_secret() {
        let keys = parse_key_entries("client-1:a:b:c").unwrap();
        assert_eq!(keys, vec![("client-1".to_owned(), "a:b:c".to_owned())]);
    }

    #[test]
    fn test_should_reject_malformed_key_entry() {
        assert!(parse_key_entries("client-1").is_err());
        assert!(parse_key_entries(":s3cr3t").is_err());
        assert!(parse_key_entries("client-1:").is_err());
    }

    #[test]
    fn test_should_skip_empty_key_entries() {
        let keys = parse_key_entries("client-1:s3cr3t,,").unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_should_parse_header_list() {
        assert_eq!(
            parse_header_list("Date, Digest"),
            vec!["date".to_owned(), "digest".to_owned()]
        );
        assert_eq!(parse_header_list("  "), vec!["date".to_owned()]);
    }

    #[test]
    fn test_should_parse_lifetime_values() {
        assert_eq!(parse_lifetime("600").unwrap(), Some(600));
        assert_eq!(parse_lifetime("none").unwrap(), None);
        assert_eq!(parse_lifetime("OFF").unwrap(), None);
        assert_eq!(parse_lifetime("0").unwrap(), None);
        assert_eq!(parse_lifetime("").unwrap(), Some(300));
        assert!(parse_lifetime("soon").is_err());
    }
}
