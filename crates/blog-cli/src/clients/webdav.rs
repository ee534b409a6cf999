//! WebDAV share client
//!
//! Listings use `PROPFIND`; the multistatus body is parsed with quick-xml,
//! matching elements by local name so any namespace prefix is accepted.

use blog_images::{DavEntry, DavService, Error, Result};
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use url::Url;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:">
  <d:prop><d:resourcetype/><d:getcontentlength/><d:getlastmodified/></d:prop>
</d:propfind>"#;

fn handle_reqwest_error(err: reqwest::Error) -> Error {
    Error::transport(err.to_string())
}

fn method(name: &'static str) -> Result<Method> {
    Method::from_bytes(name.as_bytes()).map_err(|e| Error::transport(format!("{name}: {e}")))
}

/// Basic-auth WebDAV client rooted at a collection URL.
pub struct WebDavClient {
    http: Client,
    endpoint: String,
    login: String,
    password: String,
}

impl WebDavClient {
    pub fn new(http: Client, endpoint: &str, login: &str, password: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    /// Probe the share root so bad credentials fail before any sync work.
    pub fn connect(&self) -> Result<()> {
        self.propfind("", 0)?;
        tracing::debug!(endpoint = %self.endpoint, "Connected to WebDAV share");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect();
        if encoded.is_empty() {
            format!("{}/", self.endpoint)
        } else {
            format!("{}/{}", self.endpoint, encoded.join("/"))
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.login, Some(&self.password))
    }

    fn propfind(&self, path: &str, depth: u8) -> Result<Vec<(String, DavEntry)>> {
        let response = self
            .request(method("PROPFIND")?, path)
            .header("Depth", depth.to_string())
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(PROPFIND_BODY)
            .send()
            .map_err(handle_reqwest_error)?;

        let body = checked(response, path)?.text().map_err(handle_reqwest_error)?;
        parse_multistatus(&body)
    }

    /// Create every missing collection above `path`.
    fn create_parents(&self, path: &str) -> Result<()> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        for depth in 1..segments.len() {
            let dir = segments[..depth].join("/");
            let response = self
                .request(method("MKCOL")?, &format!("{dir}/"))
                .send()
                .map_err(handle_reqwest_error)?;
            match response.status() {
                s if s.is_success() => tracing::debug!(dir, "Created WebDAV collection"),
                StatusCode::METHOD_NOT_ALLOWED => {}
                status => {
                    return Err(Error::transport(format!("MKCOL {dir}: {status}")));
                }
            }
        }
        Ok(())
    }

    fn put(&self, path: &str, bytes: &[u8]) -> Result<StatusCode> {
        let response = self
            .request(Method::PUT, path)
            .body(bytes.to_vec())
            .send()
            .map_err(handle_reqwest_error)?;
        Ok(response.status())
    }
}

/// Map non-success statuses onto image store errors.
fn checked(response: Response, path: &str) -> Result<Response> {
    match response.status() {
        s if s.is_success() => Ok(response),
        StatusCode::NOT_FOUND => Err(Error::NotFound {
            what: path.to_string(),
        }),
        status => Err(Error::transport(format!("{path}: {status}"))),
    }
}

/// Decoded path of an `href`, without surrounding slashes.
fn href_path(href: &str) -> String {
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.to_string(),
    };
    percent_decode_str(path.trim_matches('/'))
        .decode_utf8_lossy()
        .into_owned()
}

#[derive(Default)]
struct Pending {
    href: String,
    is_dir: bool,
    size: u64,
    modified: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy)]
enum Field {
    Href,
    Length,
    Modified,
}

/// Parse a `207 Multi-Status` body into `(decoded href path, entry)` pairs.
fn parse_multistatus(xml: &str) -> Result<Vec<(String, DavEntry)>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<Pending> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"response" => current = Some(Pending::default()),
                b"href" => field = Some(Field::Href),
                b"getcontentlength" => field = Some(Field::Length),
                b"getlastmodified" => field = Some(Field::Modified),
                b"collection" => {
                    if let Some(pending) = current.as_mut() {
                        pending.is_dir = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"collection"
                    && let Some(pending) = current.as_mut()
                {
                    pending.is_dir = true;
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(pending), Some(f)) = (current.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::decode(format!("PROPFIND response: {e}")))?;
                    let text = text.trim();
                    match f {
                        Field::Href => pending.href = text.to_string(),
                        Field::Length => pending.size = text.parse().unwrap_or(0),
                        Field::Modified => {
                            pending.modified = DateTime::parse_from_rfc2822(text)
                                .ok()
                                .map(|d| d.with_timezone(&Utc));
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"response" {
                    if let Some(pending) = current.take() {
                        let path = href_path(&pending.href);
                        let name = path.rsplit('/').next().unwrap_or_default().to_string();
                        entries.push((
                            path,
                            DavEntry {
                                name,
                                is_dir: pending.is_dir,
                                size: pending.size,
                                modified: pending.modified,
                            },
                        ));
                    }
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::decode(format!("PROPFIND response: {e}"))),
        }
    }

    Ok(entries)
}

impl DavService for WebDavClient {
    fn list_directory(&self, path: &str) -> Result<Vec<DavEntry>> {
        let own_path = href_path(&self.url(path));
        Ok(self
            .propfind(path, 1)?
            .into_iter()
            .filter(|(href, _)| *href != own_path)
            .map(|(_, entry)| entry)
            .collect())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .request(Method::GET, path)
            .send()
            .map_err(handle_reqwest_error)?;
        let bytes = checked(response, path)?
            .bytes()
            .map_err(handle_reqwest_error)?;
        Ok(bytes.to_vec())
    }

    fn write_file(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut status = self.put(path, bytes)?;
        if status == StatusCode::CONFLICT || status == StatusCode::NOT_FOUND {
            self.create_parents(path)?;
            status = self.put(path, bytes)?;
        }
        if !status.is_success() {
            return Err(Error::transport(format!("PUT {path}: {status}")));
        }
        Ok(())
    }

    fn stat(&self, path: &str) -> Result<DavEntry> {
        self.propfind(path, 0)?
            .into_iter()
            .next()
            .map(|(_, entry)| entry)
            .ok_or_else(|| Error::NotFound {
                what: path.to_string(),
            })
    }
}
