//! Snap.as photo host client

use blog_images::{Error, Photo, PhotoService, Result};
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};

use super::{Envelope, endpoint_url};

fn handle_reqwest_error(err: reqwest::Error) -> Error {
    Error::transport(err.to_string())
}

/// Snap.as API client authenticated with a Write.as access token.
pub struct SnapAsClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl SnapAsClient {
    pub fn new(http: Client, endpoint: &str, token: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
    expected: StatusCode,
    what: &str,
) -> Result<T> {
    let status = response.status();
    let body = response.text().map_err(handle_reqwest_error)?;
    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|e| Error::decode(format!("{what}: {e} (status {status})")))?;

    if status != expected {
        return Err(Error::transport(format!(
            "failed to {what}: {}",
            envelope.message()
        )));
    }

    envelope
        .data
        .ok_or_else(|| Error::decode(format!("{what}: response has no data")))
}

impl PhotoService for SnapAsClient {
    fn list_photos(&self) -> Result<Vec<Photo>> {
        let response = self
            .http
            .get(endpoint_url(&self.endpoint, "me/photos"))
            .header("Authorization", &self.token)
            .send()
            .map_err(handle_reqwest_error)?;

        decode(response, StatusCode::OK, "list photos")
    }

    fn upload_photo(&self, bytes: Vec<u8>, tag: &str) -> Result<Photo> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(tag.to_string()));
        let response = self
            .http
            .post(endpoint_url(&self.endpoint, "photos/upload"))
            .header("Authorization", &self.token)
            .multipart(form)
            .send()
            .map_err(handle_reqwest_error)?;

        decode(response, StatusCode::CREATED, &format!("upload {tag}"))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().map_err(handle_reqwest_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                what: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Error::transport(format!("failed to fetch {url}: {status}")));
        }
        Ok(response.bytes().map_err(handle_reqwest_error)?.to_vec())
    }
}
