use clap::Parser;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct InvocationBlob {
    params: String,
    #[serde(deserialize_with = "deserialize_seconds")]
    timeout: u64,
}

/// Flags carried inside `params`. `-h` is the host, so clap's help flag is off.
#[derive(Parser, Debug)]
#[command(
    name = "params",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct SensorArgs {
    #[arg(short = 'h', long)]
    host: String,
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    username: String,
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    password: String,
    #[arg(short, long, value_delimiter = ',')]
    include: Vec<String>,
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,
    #[arg(long)]
    verify_tls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub username: String,
    pub password: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub timeout_secs: u64,
    pub verify_tls: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Sensor failed: missing parameters argument")]
    MissingArgument,
    #[error("Sensor failed: can't decode parameters: {0}")]
    Blob(#[from] serde_json::Error),
    #[error("Sensor failed: invalid params: {0}")]
    Params(String),
    #[error("Sensor failed: can't use include and exclude")]
    IncludeAndExclude,
    #[error("Sensor failed: unknown check '{0}' in exclude")]
    UnknownExclude(String),
    #[error("Sensor failed: {0}")]
    Validation(String),
}

impl From<clap::Error> for ConfigError {
    fn from(err: clap::Error) -> Self {
        ConfigError::Params(first_line(&err.to_string()))
    }
}

impl Config {
    pub fn from_argument(raw: &str) -> Result<Self, ConfigError> {
        let blob: InvocationBlob = serde_json::from_str(raw)?;
        let args = SensorArgs::try_parse_from(blob.params.split_whitespace())
            .map_err(ConfigError::from)?;

        let cfg = Config {
            host: args.host,
            username: args.username,
            password: args.password,
            include: clean_names(args.include),
            exclude: clean_names(args.exclude),
            timeout_secs: blob.timeout,
            verify_tls: args.verify_tls,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation("host is required".to_string()));
        }
        if self.timeout_secs < 1 {
            return Err(ConfigError::Validation(
                "timeout must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn clean_names(raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn first_line(text: &str) -> String {
    text.lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SecondsInput {
        Number(u64),
        Text(String),
    }

    match SecondsInput::deserialize(deserializer)? {
        SecondsInput::Number(secs) => Ok(secs),
        SecondsInput::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("timeout '{text}' is not a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_flags() {
        let cfg = Config::from_argument(
            r#"{"params": "--host 10.0.0.5 -u root --password s3cret -i cpu,nfs3", "timeout": 60}"#,
        )
        .expect("valid blob");

        assert_eq!(cfg.host, "10.0.0.5");
        assert_eq!(cfg.username, "root");
        assert_eq!(cfg.password, "s3cret");
        assert_eq!(cfg.include, vec!["cpu", "nfs3"]);
        assert!(cfg.exclude.is_empty());
        assert_eq!(cfg.timeout_secs, 60);
        assert!(!cfg.verify_tls);
    }

    #[test]
    fn timeout_accepts_numeric_string() {
        let cfg = Config::from_argument(
            r#"{"params": "-h zfssa -e nic,,disk", "timeout": "45", "host": "probe"}"#,
        )
        .expect("valid blob");
        assert_eq!(cfg.total_deadline(), Duration::from_secs(45));
        assert_eq!(cfg.exclude, vec!["nic", "disk"]);
    }

    #[test]
    fn verify_tls_is_opt_in() {
        let cfg = Config::from_argument(r#"{"params": "-h zfssa --verify-tls", "timeout": 10}"#)
            .expect("valid blob");
        assert!(cfg.verify_tls);
    }

    #[test]
    fn credentials_may_start_with_a_hyphen() {
        let cfg = Config::from_argument(
            r#"{"params": "-h zfssa -u -admin -p -s3cret -i cpu", "timeout": 10}"#,
        )
        .expect("valid blob");
        assert_eq!(cfg.username, "-admin");
        assert_eq!(cfg.password, "-s3cret");
        assert_eq!(cfg.include, vec!["cpu"]);
    }

    #[test]
    fn unknown_flag_is_rejected() {
        let err = Config::from_argument(r#"{"params": "-h zfssa --port 215", "timeout": 10}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Params(_)));
    }

    #[test]
    fn malformed_blob_is_rejected() {
        let err = Config::from_argument("--host zfssa").unwrap_err();
        assert!(matches!(err, ConfigError::Blob(_)));

        let err = Config::from_argument(r#"{"params": "-h zfssa"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Blob(_)));

        let err = Config::from_argument(r#"{"params": "-h zfssa", "timeout": "soon"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Blob(_)));
    }

    #[test]
    fn zero_timeout_and_missing_host_fail_validation() {
        let err = Config::from_argument(r#"{"params": "-h zfssa", "timeout": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = Config::from_argument(r#"{"params": "-u root", "timeout": 10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Params(_)));
    }
}
