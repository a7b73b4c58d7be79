//! Client for Pinata's JSON pinning endpoint.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::ScriptConfig;

pub const PIN_JSON_PATH: &str = "pinning/pinJSONToIPFS";

#[derive(Debug, Error)]
pub enum PinningError {
    #[error("invalid pinning endpoint")]
    Endpoint(#[from] url::ParseError),

    #[error("request to the pinning service failed")]
    Http(#[from] reqwest::Error),

    #[error("pinning service answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected pinning response")]
    Decode(#[from] serde_json::Error),
}

/// Stores a folder object and hands back its content identifier.
#[async_trait]
pub trait PinningService: Send + Sync {
    async fn pin_empty_folder(&self, name: &str) -> Result<String, PinningError>;
}

/// Folder descriptor sent to the pinning service. The folder is always empty.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMetadata<'a> {
    pub name: &'a str,
    pub is_directory: bool,
    pub files: Vec<serde_json::Value>,
}

impl<'a> FolderMetadata<'a> {
    pub fn empty(name: &'a str) -> Self {
        Self {
            name,
            is_directory: true,
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PinResponse {
    #[serde(rename = "IpfsHash")]
    pub ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pub pin_size: Option<u64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
}

pub struct PinataClient {
    client: reqwest::Client,
    endpoint: Url,
    jwt: String,
}

impl PinataClient {
    pub fn new(api_url: &Url, jwt: impl Into<String>) -> Result<Self, PinningError> {
        // `join` drops the last path segment unless the base ends with a slash
        let mut base = api_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: base.join(PIN_JSON_PATH)?,
            jwt: jwt.into(),
        })
    }

    pub fn from_config(config: &ScriptConfig) -> Result<Self, PinningError> {
        Self::new(&config.pinata_api_url, config.pinata_jwt.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_empty_folder(&self, name: &str) -> Result<String, PinningError> {
        debug!(endpoint = %self.endpoint, name, "pinning folder");
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.jwt))
            .json(&FolderMetadata::empty(name))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            return Err(PinningError::Status { status, body });
        }

        let body = response.bytes().await?;
        let pinned: PinResponse = serde_json::from_slice(&body)?;
        info!(
            ipfs_hash = %pinned.ipfs_hash,
            pin_size = ?pinned.pin_size,
            timestamp = ?pinned.timestamp,
            "folder pinned"
        );
        Ok(pinned.ipfs_hash)
    }
}
