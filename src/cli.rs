//! Command-line argument parsing for sqlprobe.

use crate::request::RequestFields;
use clap::Parser;
use std::path::PathBuf;

/// Runs one SQL query against a database and prints the typed result as JSON.
#[derive(Parser, Debug)]
#[command(name = "sqlprobe")]
#[command(about, long_about = None)]
pub struct Cli {
    /// Database engine name (e.g., mysql, postgre, sqlite)
    #[arg(long, env = "SQLPROBE_ENGINE", value_name = "ENGINE")]
    pub engine: Option<String>,

    /// Engine version, echoed in the output
    #[arg(long = "version", env = "SQLPROBE_VERSION", value_name = "VERSION")]
    pub engine_version: Option<String>,

    /// Connection string (e.g., "Server=db;Port=5432;Database=app;Uid=reader;Pwd=...")
    #[arg(
        long,
        env = "SQLPROBE_CONNECTION_STRING",
        value_name = "CONNECTION_STRING",
        hide_env_values = true
    )]
    pub connection_string: Option<String>,

    /// SQL text to execute
    #[arg(long, env = "SQLPROBE_SQL", value_name = "SQL", hide_env_values = true)]
    pub sql: Option<String>,

    /// Use named request from config
    #[arg(short = 'r', long, value_name = "NAME")]
    pub request: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named request to use, if specified.
    pub fn request_name(&self) -> Option<&str> {
        self.request.as_deref()
    }

    /// Moves the request fields given on the command line into `RequestFields`.
    pub fn take_fields(&mut self) -> RequestFields {
        RequestFields {
            engine: self.engine.take(),
            version: self.engine_version.take().map(Into::into),
            connection_string: self.connection_string.take().map(Into::into),
            sql: self.sql.take().map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::SecretString;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_request_fields() {
        let mut cli = parse_args(&[
            "sqlprobe",
            "--engine",
            "sqlite",
            "--version",
            "3",
            "--connection-string",
            "Database=/tmp/x.db",
            "--sql",
            "SELECT 1 AS n",
        ]);

        assert_eq!(cli.engine, Some("sqlite".to_string()));
        assert_eq!(cli.engine_version, Some("3".to_string()));

        let fields = cli.take_fields();
        assert_eq!(fields.engine.as_deref(), Some("sqlite"));
        assert_eq!(fields.version.as_ref().map(SecretString::expose), Some("3"));
        assert_eq!(
            fields.connection_string.as_ref().map(SecretString::expose),
            Some("Database=/tmp/x.db")
        );
        assert_eq!(
            fields.sql.as_ref().map(SecretString::expose),
            Some("SELECT 1 AS n")
        );
        assert!(cli.connection_string.is_none());
    }

    #[test]
    fn test_parse_named_request() {
        let cli = parse_args(&["sqlprobe", "--request", "health"]);
        assert_eq!(cli.request_name(), Some("health"));

        let cli = parse_args(&["sqlprobe", "-r", "nightly"]);
        assert_eq!(cli.request_name(), Some("nightly"));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["sqlprobe", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_default_config_path() {
        let cli = parse_args(&["sqlprobe"]);
        assert_eq!(cli.config_path(), crate::config::Config::default_path());
        assert!(!cli.pretty);
    }

    #[test]
    fn test_pretty_flag() {
        let cli = parse_args(&["sqlprobe", "--pretty"]);
        assert!(cli.pretty);
    }
}
