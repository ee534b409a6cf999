//! HTTP implementations of the remote service seams
//!
//! - [`writeas`]: the blog service
//! - [`snapas`]: the flat photo host
//! - [`webdav`]: the WebDAV share

pub mod snapas;
pub mod webdav;
pub mod writeas;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{CliError, Result};
use crate::settings::HttpSettings;

const USER_AGENT: &str = concat!("blogsync/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all services.
pub fn http_client(settings: &HttpSettings) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .build()
        .map_err(|e| CliError::user(format!("Failed to build HTTP client: {e}")))
}

/// Response wrapper used by the Write.as and Snap.as APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(default)]
    pub code: u16,
    pub data: Option<T>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl<T> Envelope<T> {
    /// Server-provided error text, or the status code.
    pub fn message(&self) -> String {
        self.error_msg
            .clone()
            .unwrap_or_else(|| format!("status {}", self.code))
    }
}

/// Join an API endpoint and a path without doubling the slash.
pub(crate) fn endpoint_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_endpoint_paths() {
        assert_eq!(
            endpoint_url("https://write.as/api/", "/auth/login"),
            "https://write.as/api/auth/login"
        );
        assert_eq!(
            endpoint_url("https://snap.as/api", "me/photos"),
            "https://snap.as/api/me/photos"
        );
    }

    #[test]
    fn envelope_message_prefers_server_text() {
        let env: Envelope<()> =
            serde_json::from_str(r#"{"code": 401, "error_msg": "Incorrect password."}"#).unwrap();
        assert_eq!(env.message(), "Incorrect password.");

        let env: Envelope<()> = serde_json::from_str(r#"{"code": 500}"#).unwrap();
        assert_eq!(env.message(), "status 500");
    }
}
