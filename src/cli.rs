//! Command-line flags. Every flag that tunes runtime behaviour also reads an
//! environment variable, and both win over `settings.conf`.
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "customer-manager",
    version,
    about = "TUI to manage customer records stored behind a REST API"
)]
pub struct Cli {
    /// Customers collection URL, e.g. http://127.0.0.1:5000/customers
    #[arg(long, env = "CUSTOMER_MANAGER_API_URL")]
    pub api_url: Option<String>,

    /// Directory for settings.conf, theme.conf, keybinds.conf and the default log file
    #[arg(long, env = "CUSTOMER_MANAGER_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log file path (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "CUSTOMER_MANAGER_LOG", default_value = "info")]
    pub log_level: String,

    /// Notification display time in milliseconds
    #[arg(long)]
    pub toast_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "customer-manager",
            "--api-url",
            "http://localhost:9000/customers",
            "--toast-ms",
            "1200",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000/customers"));
        assert_eq!(cli.toast_ms, Some(1200));
        assert_eq!(cli.log_level, "debug");
        assert!(cli.config_dir.is_none());
    }
}
