use std::path::PathBuf;

use clap::Parser;

use super::logging::LogDestination;

#[derive(Parser, Debug, Default)]
#[command(name = "validator_app", version, about = "Bulk email validation client")]
pub struct Cli {
    /// RON configuration file (defaults to ./validator.ron when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the Validation Service
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Results shown per page
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Where log lines are written
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_flags() {
        let cli = Cli::parse_from([
            "validator_app",
            "--config",
            "conf/validator.ron",
            "--api-url",
            "http://10.0.0.5:5000",
            "--limit",
            "25",
            "--log",
            "both",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("conf/validator.ron")));
        assert_eq!(cli.api_url.as_deref(), Some("http://10.0.0.5:5000"));
        assert_eq!(cli.limit, Some(25));
        assert_eq!(cli.log, Some(LogDestination::Both));
    }

    #[test]
    fn flags_are_optional() {
        let cli = Cli::parse_from(["validator_app"]);
        assert!(cli.config.is_none() && cli.api_url.is_none());
        assert!(cli.limit.is_none() && cli.log.is_none());
    }

    #[test]
    fn rejects_unknown_log_destination() {
        assert!(Cli::try_parse_from(["validator_app", "--log", "syslog"]).is_err());
    }
}
