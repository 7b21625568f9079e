//! Client for the remote file-hosting service.
//!
//! Files are addressed by the opaque id the host returns on upload; the
//! storefront keeps only that id in its documents.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::MediaConfig;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media hosting is disabled")]
    Disabled,

    #[error("invalid media host URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("media host URL cannot carry a path: {0}")]
    BaseUrl(String),

    #[error("media host unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media host returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl MediaError {
    pub fn status(&self) -> StatusCode {
        match self {
            MediaError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            MediaError::Upstream { status: 404, .. } => StatusCode::NOT_FOUND,
            MediaError::Url(_) | MediaError::BaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MediaError::Request(_) | MediaError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Metadata of a hosted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Downloaded file body.
#[derive(Debug, Clone)]
pub struct MediaContent {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl MediaClient {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(MediaError::BaseUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            api_key: config.api_key.clone(),
        })
    }

    /// `base/files/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MediaError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| MediaError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("files")
            .extend(segments);
        Ok(url)
    }

    pub async fn list(&self) -> Result<Vec<MediaFile>, MediaError> {
        let res = self
            .http
            .get(self.endpoint(&[])?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Ok(check(res).await?.json().await?)
    }

    pub async fn upload(
        &self,
        name: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<MediaFile, MediaError> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut().append_pair("name", name);

        let mut req = self.http.post(url).bearer_auth(&self.api_key).body(body);
        if let Some(content_type) = content_type {
            req = req.header(CONTENT_TYPE, content_type);
        }
        let file: MediaFile = check(req.send().await?).await?.json().await?;
        tracing::info!(media_id = %file.id, name = %file.name, "Media uploaded");
        Ok(file)
    }

    pub async fn delete(&self, id: &str) -> Result<(), MediaError> {
        let res = self
            .http
            .delete(self.endpoint(&[id])?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        check(res).await?;
        tracing::info!(media_id = %id, "Media deleted");
        Ok(())
    }

    pub async fn download(&self, id: &str) -> Result<MediaContent, MediaError> {
        let res = self
            .http
            .get(self.endpoint(&[id, "content"])?)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let res = check(res).await?;
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(MediaContent {
            bytes: res.bytes().await?,
            content_type,
        })
    }
}

async fn check(res: reqwest::Response) -> Result<reqwest::Response, MediaError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "Media host call failed");
    Err(MediaError::Upstream {
        status: status.as_u16(),
        body,
    })
}
