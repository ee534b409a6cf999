//! Write.as blog client

use blog_core::{BlogService, Error, NewPost, PostUpdate, RemotePost, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Envelope, endpoint_url};

fn handle_reqwest_error(err: reqwest::Error) -> Error {
    Error::transport(err.to_string())
}

#[derive(Serialize)]
struct Credentials<'a> {
    alias: &'a str,
    pass: &'a str,
}

#[derive(Deserialize)]
struct AuthUser {
    access_token: String,
}

#[derive(Deserialize)]
struct CollectionPosts {
    #[serde(default)]
    posts: Vec<RemotePost>,
}

/// Authenticated Write.as API client.
pub struct WriteAsClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl WriteAsClient {
    /// Log in and keep the access token for later calls.
    pub fn login(http: Client, endpoint: &str, login: &str, password: &str) -> Result<Self> {
        let response = http
            .post(endpoint_url(endpoint, "auth/login"))
            .json(&Credentials {
                alias: login,
                pass: password,
            })
            .send()
            .map_err(handle_reqwest_error)?;

        let user: AuthUser = decode(response, "log in")?;
        tracing::debug!("Logged into Write.as");

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            token: user.access_token,
        })
    }

    /// Access token, shared with Snap.as.
    pub fn token(&self) -> &str {
        &self.token
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("Authorization", format!("Token {}", self.token))
    }
}

/// Unwrap a `{code, data}` envelope, mapping failures onto engine errors.
fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    let body = response.text().map_err(handle_reqwest_error)?;

    if status == StatusCode::NOT_FOUND {
        return Err(Error::not_found(what));
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)
        .map_err(|e| Error::decode(format!("{what}: {e} (status {status})")))?;

    if !status.is_success() {
        return Err(Error::transport(format!(
            "failed to {what}: {}",
            envelope.message()
        )));
    }

    envelope
        .data
        .ok_or_else(|| Error::decode(format!("{what}: response has no data")))
}

impl BlogService for WriteAsClient {
    fn list_posts(&self, collection: &str, page: u32) -> Result<Vec<RemotePost>> {
        let url = endpoint_url(&self.endpoint, &format!("collections/{collection}/posts"));
        let response = self
            .authorized(self.http.get(url).query(&[("page", page)]))
            .send()
            .map_err(handle_reqwest_error)?;

        let data: CollectionPosts = decode(response, &format!("list collection {collection}"))?;
        Ok(data.posts)
    }

    fn create_post(&self, collection: &str, post: &NewPost) -> Result<RemotePost> {
        let url = endpoint_url(&self.endpoint, &format!("collections/{collection}/posts"));
        let response = self
            .authorized(self.http.post(url).json(post))
            .send()
            .map_err(handle_reqwest_error)?;

        decode(response, &format!("create post {}", post.slug))
    }

    fn update_post(&self, id: &str, update: &PostUpdate) -> Result<RemotePost> {
        let url = endpoint_url(&self.endpoint, &format!("posts/{id}"));
        let response = self
            .authorized(self.http.post(url).json(update))
            .send()
            .map_err(handle_reqwest_error)?;

        decode(response, &format!("update post {id}"))
    }
}
