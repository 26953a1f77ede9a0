use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client, Method, StatusCode};
use serde::Deserialize;

use crate::util::child_url;

use super::{RemoteNode, RemoteStore, Result, StoreError};

/// An HTTP implementation of [`RemoteStore`].
///
/// Operates against a pod storage server speaking the pod HTTP API:
/// `GET` on a container returns a JSON listing of its children, resources
/// are created with `Slug`-headed `POST`s into their parent container,
/// containers are created with `PUT`, and nodes are removed with `DELETE`.
pub struct HttpStore {
    client: Client,
    token: Option<String>,
}

impl HttpStore {
    /// Create a store that sends unauthenticated requests.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            token: None,
        }
    }

    /// Create a store that authenticates every request with a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: Some(token.into()),
        }
    }

    /// Create a store with a custom reqwest client.
    pub fn with_client(client: Client, token: Option<String>) -> Self {
        Self { client, token }
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }
}

impl Default for HttpStore {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a container listing document.
#[derive(Debug, Deserialize)]
struct ListingEntry {
    url: String,
    #[serde(default)]
    container: bool,
    #[serde(default, rename = "contentType")]
    content_type: Option<String>,
}

fn error_for_status(url: &str, status: StatusCode) -> StoreError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => StoreError::NotFound(url.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Forbidden(url.to_string()),
        status => StoreError::Other(format!("unexpected status {} for {}", status, url)),
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

fn content_type_header(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
}

/// Resolve a possibly-relative `Location` header against the container URL.
fn resolve_location(container_url: &str, location: &str) -> String {
    if location.contains("://") {
        return location.to_string();
    }
    if let Some(rest) = location.strip_prefix('/') {
        if let Some(scheme_end) = container_url.find("://") {
            let after_scheme = &container_url[scheme_end + 3..];
            let host_end = after_scheme
                .find('/')
                .map(|i| scheme_end + 3 + i)
                .unwrap_or(container_url.len());
            return format!("{}/{}", &container_url[..host_end], rest);
        }
    }
    format!("{}/{}", container_url.trim_end_matches('/'), location)
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_children(&self, container_url: &str) -> Result<Vec<RemoteNode>> {
        let response = self
            .request(Method::GET, container_url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(container_url, response.status()));
        }

        let entries: Vec<ListingEntry> = response.json().await.map_err(transport)?;

        // A well-behaved server only advertises its own children; drop any
        // entry whose URL does not extend the container URL.
        Ok(entries
            .into_iter()
            .filter(|entry| entry.url.starts_with(container_url) && entry.url != container_url)
            .map(|entry| RemoteNode {
                url: entry.url,
                is_container: entry.container,
                content_type: entry.content_type,
            })
            .collect())
    }

    async fn get_metadata(&self, url: &str) -> Result<RemoteNode> {
        let response = self
            .request(Method::HEAD, url)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(url, response.status()));
        }

        let is_container = url.ends_with('/');
        let content_type = if is_container {
            None
        } else {
            content_type_header(&response)
        };

        Ok(RemoteNode {
            url: url.to_string(),
            is_container,
            content_type,
        })
    }

    async fn read_bytes(&self, url: &str) -> Result<(Bytes, String)> {
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(url, response.status()));
        }

        let content_type =
            content_type_header(&response).unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = response.bytes().await.map_err(transport)?;
        Ok((bytes, content_type))
    }

    async fn write_bytes(
        &self,
        container_url: &str,
        bytes: Bytes,
        slug: &str,
        content_type: &str,
    ) -> Result<RemoteNode> {
        let response = self
            .request(Method::POST, container_url)
            .header("Slug", slug)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(container_url, response.status()));
        }

        // The server may have renamed the slug; the Location header holds
        // the URL it actually chose.
        let url = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(|location| resolve_location(container_url, location))
            .unwrap_or_else(|| child_url(container_url, slug, false));

        Ok(RemoteNode {
            url,
            is_container: false,
            content_type: Some(content_type.to_string()),
        })
    }

    async fn delete_resource(&self, url: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, url)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(url, response.status()));
        }
        Ok(())
    }

    async fn create_container(&self, url: &str) -> Result<RemoteNode> {
        let response = self
            .request(Method::PUT, url)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_for_status(url, response.status()));
        }

        Ok(RemoteNode {
            url: url.to_string(),
            is_container: true,
            content_type: None,
        })
    }
}
