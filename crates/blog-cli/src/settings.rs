//! Layered settings resolution
//!
//! Later layers override earlier ones:
//! 1. built-in defaults
//! 2. the settings file (`--config`, or `blogsync.toml` in the root)
//! 3. environment variables (merged into the flags by clap)
//! 4. command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use blog_fs::{ConfigStore, RetryPolicy};
use clap::ValueEnum;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub const DEFAULT_WRITEAS_ENDPOINT: &str = "https://write.as/api";
pub const DEFAULT_SNAPAS_ENDPOINT: &str = "https://snap.as/api";
pub const SETTINGS_FILE: &str = "blogsync.toml";

/// Which image backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostingType {
    #[default]
    Snapas,
    Webdav,
}

/// Contents of a settings file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub alias: Option<String>,
    pub root: Option<PathBuf>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub image_hosting_type: Option<HostingType>,
    pub image_login: Option<String>,
    pub image_password: Option<String>,
    pub webdav_endpoint: Option<String>,
    pub webdav_published_url: Option<String>,
    pub snapas_endpoint: Option<String>,
    pub writeas_endpoint: Option<String>,
    pub retry: Option<RetryPolicy>,
    pub http: Option<HttpSettings>,
}

/// HTTP client limits, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// The image backend with its required parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHosting {
    SnapAs {
        endpoint: String,
    },
    WebDav {
        endpoint: String,
        published_url: String,
        login: String,
        password: String,
    },
}

/// Fully resolved and validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub alias: String,
    pub root: PathBuf,
    pub login: String,
    pub password: String,
    pub writeas_endpoint: String,
    pub hosting: ImageHosting,
    pub retry: RetryPolicy,
    pub http: HttpSettings,
}

impl Settings {
    /// Resolve settings from the parsed command line.
    ///
    /// `cwd` is the default root and the base for relative paths.
    pub fn resolve(cli: &Cli, cwd: &Path) -> Result<Self> {
        let root_hint = cli
            .root
            .as_ref()
            .map(|r| cwd.join(r))
            .unwrap_or_else(|| cwd.to_path_buf());

        let store = ConfigStore::new();
        let file: FileSettings = match &cli.config {
            Some(path) => store.load(&cwd.join(path))?,
            None => store
                .load_optional(&root_hint.join(SETTINGS_FILE))?
                .unwrap_or_default(),
        };

        Self::merge(cli, file, cwd)
    }

    fn merge(cli: &Cli, file: FileSettings, cwd: &Path) -> Result<Self> {
        let root = cli
            .root
            .clone()
            .or(file.root)
            .map(|r| cwd.join(r))
            .unwrap_or_else(|| cwd.to_path_buf());

        let alias = required(cli.alias.clone().or(file.alias), "collection alias", "--alias")?;
        let login = required(cli.login.clone().or(file.login), "login", "--login")?;
        let password = required(cli.password.clone().or(file.password), "password", "--password")?;

        let hosting = match cli
            .image_hosting_type
            .or(file.image_hosting_type)
            .unwrap_or_default()
        {
            HostingType::Snapas => ImageHosting::SnapAs {
                endpoint: cli
                    .snapas_endpoint
                    .clone()
                    .or(file.snapas_endpoint)
                    .unwrap_or_else(|| DEFAULT_SNAPAS_ENDPOINT.to_string()),
            },
            HostingType::Webdav => ImageHosting::WebDav {
                endpoint: required(
                    cli.webdav_endpoint.clone().or(file.webdav_endpoint),
                    "WebDAV endpoint",
                    "--webdav-endpoint",
                )?,
                published_url: required(
                    cli.webdav_published_url.clone().or(file.webdav_published_url),
                    "WebDAV published URL",
                    "--webdav-published-url",
                )?,
                login: cli
                    .image_login
                    .clone()
                    .or(file.image_login)
                    .unwrap_or_else(|| login.clone()),
                password: cli
                    .image_password
                    .clone()
                    .or(file.image_password)
                    .unwrap_or_else(|| password.clone()),
            },
        };

        Ok(Self {
            alias,
            root,
            login,
            password,
            writeas_endpoint: cli
                .writeas_endpoint
                .clone()
                .or(file.writeas_endpoint)
                .unwrap_or_else(|| DEFAULT_WRITEAS_ENDPOINT.to_string()),
            hosting,
            retry: file.retry.unwrap_or_default(),
            http: file.http.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, what: &str, flag: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(CliError::user(format!(
            "{what} is required (pass {flag} or set it in {SETTINGS_FILE})"
        ))),
    }
}
