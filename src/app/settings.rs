//! Runtime settings: parse/write `settings.conf` and layer CLI overrides on top.
//!
//! Precedence is defaults < `settings.conf` < environment/flags. Unknown keys
//! are ignored and invalid values keep whatever was set before them.

use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_API_URL;
use crate::cli::Cli;

/// Toast auto-hide delay.
pub const DEFAULT_TOAST_MS: u64 = 5000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Collection URL of the customers resource.
    pub api_url: String,
    pub toast_ms: u64,
    /// 0 disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            toast_ms: DEFAULT_TOAST_MS,
            request_timeout_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing the defaults there first if it is missing.
    pub fn load_or_init(path: impl AsRef<Path>) -> Self {
        let p = path.as_ref();
        if p.exists() {
            return Self::from_file(p).unwrap_or_default();
        }
        let s = Self::default();
        if let Err(e) = s.write_file(p) {
            tracing::warn!(path = %p.display(), error = %e, "could not write default settings");
        }
        s
    }

    /// Parse a settings file; `None` if it cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let lhs = parts.next().map(|s| s.trim()).unwrap_or("");
            let rhs = parts.next().map(|s| s.trim()).unwrap_or("");
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            match lhs {
                "api_url" => {
                    if is_http_url(rhs) {
                        cfg.api_url = rhs.to_string();
                    } else {
                        tracing::warn!(value = rhs, "ignoring api_url without http(s) scheme");
                    }
                }
                "toast_ms" => {
                    if let Ok(v) = rhs.parse() {
                        cfg.toast_ms = v;
                    }
                }
                "request_timeout_secs" => {
                    if let Ok(v) = rhs.parse() {
                        cfg.request_timeout_secs = v;
                    }
                }
                _ => {}
            }
        }
        cfg
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# customer-manager settings\n");
        buf.push_str("# Collection URL; items are addressed as <api_url>/<id>\n");
        let _ = writeln!(&mut buf, "api_url = {}", self.api_url);
        buf.push_str("# How long notifications stay visible, in milliseconds\n");
        let _ = writeln!(&mut buf, "toast_ms = {}", self.toast_ms);
        buf.push_str("# Per-request timeout in seconds; 0 waits forever\n");
        let _ = writeln!(&mut buf, "request_timeout_secs = {}", self.request_timeout_secs);
        super::write_config(path.as_ref(), &buf)
    }

    /// Apply flags and environment variables captured by clap.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = cli.api_url.as_deref() {
            if is_http_url(url) {
                self.api_url = url.to_string();
            } else {
                tracing::warn!(value = url, "ignoring --api-url without http(s) scheme");
            }
        }
        if let Some(ms) = cli.toast_ms {
            self.toast_ms = ms;
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_overrides_known_keys_and_skips_junk() {
        let s = Settings::parse(
            "# comment\napi_url = https://crm.local/api/customers\ntoast_ms = 1500\nrequest_timeout_secs = oops\nbogus = 1\nnot a pair\n",
        );
        assert_eq!(s.api_url, "https://crm.local/api/customers");
        assert_eq!(s.toast_ms, 1500);
        assert_eq!(s.request_timeout_secs, 0);
        assert_eq!(s.request_timeout(), None);
    }

    #[test]
    fn non_http_api_url_keeps_default() {
        let s = Settings::parse("api_url = ftp://nope\n");
        assert_eq!(s.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut s = Settings::parse("toast_ms = 100\n");
        let cli = Cli {
            api_url: Some("http://10.0.0.2:8080/customers".into()),
            config_dir: None,
            log_file: None,
            log_level: "info".into(),
            toast_ms: Some(2500),
        };
        s.apply_cli(&cli);
        assert_eq!(s.api_url, "http://10.0.0.2:8080/customers");
        assert_eq!(s.toast_duration(), Duration::from_millis(2500));
    }

    #[test]
    fn timeout_enabled_when_positive() {
        let s = Settings::parse("request_timeout_secs = 7\n");
        assert_eq!(s.request_timeout(), Some(Duration::from_secs(7)));
    }
}
