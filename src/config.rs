// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fmt, fs, path::Path};
use tracing::debug;
use url::Url;

/// Default Redshift port.
const DEFAULT_PORT: u16 = 5439;

/// Env var that overrides `cluster.password`.
pub const PASSWORD_ENV: &str = "DWH_PASSWORD";

/// Everything the two entry points need, loaded once per process.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DwhConfig {
    pub cluster: ClusterConfig,
    pub iam_role: IamRoleConfig,
    pub s3: S3Config,
    pub aws: AwsConfig,
}

/// Connection parameters for the warehouse.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ClusterConfig {
    pub host: String,
    pub db_name: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl fmt::Debug for ClusterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConfig")
            .field("host", &self.host)
            .field("db_name", &self.db_name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// The role the warehouse assumes to read from object storage.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IamRoleConfig {
    pub arn: String,
}

/// Source locations for the two datasets.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct S3Config {
    pub log_data: String,
    /// JSONPaths file for the event logs; `None` falls back to `auto`.
    #[serde(default)]
    pub log_jsonpath: Option<String>,
    pub song_data: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AwsConfig {
    pub region: String,
}

impl DwhConfig {
    /// Read and validate a YAML config file, applying env overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let mut cfg = Self::from_yaml_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        debug!(config = ?cfg, "loaded config");
        Ok(cfg)
    }

    /// Parse without env overrides or validation.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("deserializing YAML config")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(pw) = env::var(PASSWORD_ENV) {
            self.cluster.password = pw;
        }
    }

    /// Reject configs that would only fail later, statement by statement.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("cluster.host", &self.cluster.host),
            ("cluster.db_name", &self.cluster.db_name),
            ("cluster.user", &self.cluster.user),
            ("iam_role.arn", &self.iam_role.arn),
            ("aws.region", &self.aws.region),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("config key `{}` must not be empty", key);
            }
        }

        check_s3_url("s3.log_data", &self.s3.log_data)?;
        check_s3_url("s3.song_data", &self.s3.song_data)?;
        if let Some(jsonpath) = &self.s3.log_jsonpath {
            check_s3_url("s3.log_jsonpath", jsonpath)?;
        }
        Ok(())
    }
}

fn check_s3_url(key: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("`{}` is not a URL: {}", key, value))?;
    if url.scheme() != "s3" {
        anyhow::bail!("`{}` must be an s3:// location, got {}", key, value);
    }
    if url.host_str().map_or(true, str::is_empty) {
        anyhow::bail!("`{}` has no bucket: {}", key, value);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample() -> DwhConfig {
    DwhConfig {
        cluster: ClusterConfig {
            host: "dwh.example.us-west-2.redshift.amazonaws.com".into(),
            db_name: "dwh".into(),
            user: "dwhuser".into(),
            password: "Passw0rd".into(),
            port: DEFAULT_PORT,
            connect_timeout_secs: None,
        },
        iam_role: IamRoleConfig {
            arn: "arn:aws:iam::123456789012:role/dwhRole".into(),
        },
        s3: S3Config {
            log_data: "s3://example-bucket/log_data".into(),
            log_jsonpath: Some("s3://example-bucket/log_json_path.json".into()),
            song_data: "s3://example-bucket/song_data".into(),
        },
        aws: AwsConfig {
            region: "us-west-2".into(),
        },
    }
}
