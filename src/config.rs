//! Configuration management with serde serialization/deserialization
//!
//! `Config` holds every startup option of the tool and can be loaded from a
//! JSON file. `RequestConfig` is the immutable, per-run slice of it that the
//! workers share while fetching pages.

use crate::FetchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the parameter miner
///
/// # Examples
///
/// ```rust
/// use param_miner::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     concurrency: 50,
///     headers: vec!["Cookie: session=abc".to_string()],
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Custom request headers in the form `key: value`, sent in order
    pub headers: Vec<String>,

    /// Proxy every request through this URL (e.g. `http://127.0.0.1:8080`)
    pub proxy: Option<String>,

    /// File receiving one rewritten URL per line (default: extracted_params.txt)
    pub output: PathBuf,

    /// Number of concurrent workers (default: 10)
    pub concurrency: usize,

    /// Per-request timeout (default: 30 seconds)
    ///
    /// Serialized as a duration string such as `"30s"` or `"1m30s"`.
    #[serde(with = "duration_str")]
    pub timeout: Duration,

    /// Suppress informational and error console output
    pub quiet: bool,

    /// Print extracted parameters for every URL to the console
    pub verbose: bool,

    /// Follow HTTP redirects (default: true)
    ///
    /// When disabled the first redirect response is scanned as-is.
    pub follow_redirects: bool,

    /// HTTP request method (default: GET)
    pub method: String,

    /// Prefix prepended verbatim to every input URL
    pub base_url: Option<String>,

    /// File with one URL per line; stdin when absent
    pub input: Option<PathBuf>,

    /// File receiving failure lines; stderr when absent
    pub error_log: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            proxy: None,
            output: PathBuf::from("extracted_params.txt"),
            concurrency: 10,
            timeout: Duration::from_secs(30),
            quiet: false,
            verbose: false,
            follow_redirects: true,
            method: "GET".to_string(),
            base_url: None,
            input: None,
            error_log: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("Concurrency must be greater than 0");
        }

        if self.timeout.is_zero() {
            anyhow::bail!("Timeout must be greater than 0");
        }

        if self.method.trim().is_empty() {
            anyhow::bail!("HTTP method must not be empty");
        }

        Ok(())
    }

    /// Snapshot of the fields the request executor needs.
    pub fn request_config(&self) -> RequestConfig {
        RequestConfig {
            method: self.method.trim().to_string(),
            base_url: self.base_url.clone().filter(|b| !b.is_empty()),
            headers: self.headers.clone(),
            proxy: self.proxy.clone().filter(|p| !p.trim().is_empty()),
            timeout: self.timeout,
            follow_redirects: self.follow_redirects,
        }
    }
}

/// Immutable request settings shared read-only by every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: String,
    pub base_url: Option<String>,
    /// Raw `key: value` strings; parsed on every request.
    pub headers: Vec<String>,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Config::default().request_config()
    }
}

impl RequestConfig {
    /// Final request target. Plain concatenation, no URL joining.
    pub fn target(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{base}{url}"),
            None => url.to_string(),
        }
    }

    pub fn parsed_headers(&self) -> Result<Vec<(String, String)>, FetchError> {
        self.headers.iter().map(|raw| parse_header(raw)).collect()
    }
}

/// Split a raw header on its first colon, trimming both halves.
pub fn parse_header(raw: &str) -> Result<(String, String), FetchError> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| FetchError::InvalidHeader(raw.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(FetchError::InvalidHeader(raw.to_string()));
    }

    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse durations such as `30s`, `500ms`, `1m30s`, `1.5h` or bare seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = input;

    while !rest.is_empty() {
        let unit_start = rest
            .find(|c: char| !is_number(c))
            .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
        let (number, tail) = rest.split_at(unit_start);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;

        let unit_end = tail.find(is_number).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let scale = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };

        total += Duration::try_from_secs_f64(value * scale)
            .map_err(|_| format!("duration {input:?} out of range"))?;
        rest = next;
    }

    Ok(total)
}

mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}ms", value.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.method, "GET");
        assert_eq!(config.output, PathBuf::from("extracted_params.txt"));
        assert!(config.follow_redirects);
        assert!(!config.quiet);
        assert!(!config.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            method: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: Config =
            serde_json::from_str(r#"{"concurrency": 3, "timeout": "1m30s", "proxy": "http://127.0.0.1:8080"}"#)
                .unwrap();
        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.proxy.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(config.method, "GET");
    }

    #[test]
    fn test_config_json_keeps_timeout() {
        let config = Config {
            timeout: Duration::from_millis(1500),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_request_config_from_config() {
        let config = Config {
            method: " post ".to_string(),
            base_url: Some(String::new()),
            proxy: Some(" ".to_string()),
            follow_redirects: false,
            ..Default::default()
        };
        let request = config.request_config();
        assert_eq!(request.method, "post");
        assert!(request.base_url.is_none());
        assert!(request.proxy.is_none());
        assert!(!request.follow_redirects);
    }

    #[test]
    fn test_target_concatenates_base_url() {
        let request = RequestConfig {
            base_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(request.target("/login?x=1"), "https://example.com/login?x=1");
        assert_eq!(RequestConfig::default().target("http://h/a"), "http://h/a");
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Cookie:  a=b; c=d ").unwrap(),
            ("Cookie".to_string(), "a=b; c=d".to_string())
        );
        assert_eq!(
            parse_header("X-Url: http://h:8080").unwrap(),
            ("X-Url".to_string(), "http://h:8080".to_string())
        );
        assert_eq!(
            parse_header("X-Foo"),
            Err(FetchError::InvalidHeader("X-Foo".to_string()))
        );
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parsed_headers_fail_on_first_bad_entry() {
        let request = RequestConfig {
            headers: vec!["A: 1".to_string(), "broken".to_string()],
            ..Default::default()
        };
        assert_eq!(
            request.parsed_headers(),
            Err(FetchError::InvalidHeader("broken".to_string()))
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("abc").is_err());
    }
}
