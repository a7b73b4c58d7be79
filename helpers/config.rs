//! Script configuration read from the process environment.

use std::{fmt, path::PathBuf};

use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use url::Url;

pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";
pub const RPC_URL_VAR: &str = "ALCHEMY_URL";
pub const PINATA_JWT_VAR: &str = "PINATA_JWT";
pub const PINATA_API_URL_VAR: &str = "PINATA_API_URL";
pub const ARTIFACT_PATH_VAR: &str = "CONTRACT_ARTIFACT";
pub const BASE_URI_VAR: &str = "BASE_URI";

pub const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/contracts/SimpleNFT1155.sol/SimpleNFT1155.json";
pub const DEFAULT_BASE_URI: &str = "ipfs://your-metadata-folder/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("PRIVATE_KEY is not a valid signing key")]
    InvalidSigningKey(#[source] alloy::signers::local::LocalSignerError),

    #[error("{var} is not a valid URL")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Everything the deploy/pin/record run needs, built once at startup.
#[derive(Clone)]
pub struct ScriptConfig {
    pub signer: PrivateKeySigner,
    pub rpc_url: Url,
    pub pinata_jwt: String,
    pub pinata_api_url: Url,
    pub artifact_path: PathBuf,
    pub base_uri: String,
}

impl ScriptConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // a missing .env file is fine, the variables may come from the shell
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values count as missing. All missing required keys are
    /// reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let private_key = value(PRIVATE_KEY_VAR);
        let rpc_url = value(RPC_URL_VAR);
        let pinata_jwt = value(PINATA_JWT_VAR);

        let (Some(private_key), Some(rpc_url), Some(pinata_jwt)) = (private_key, rpc_url, pinata_jwt)
        else {
            let missing = [PRIVATE_KEY_VAR, RPC_URL_VAR, PINATA_JWT_VAR]
                .into_iter()
                .filter(|&key| value(key).is_none())
                .collect();
            return Err(ConfigError::Missing(missing));
        };

        let signer = private_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(ConfigError::InvalidSigningKey)?;
        let rpc_url = parse_url(RPC_URL_VAR, &rpc_url)?;
        let pinata_api_url = parse_url(
            PINATA_API_URL_VAR,
            &value(PINATA_API_URL_VAR).unwrap_or_else(|| DEFAULT_PINATA_API_URL.to_string()),
        )?;

        Ok(Self {
            signer,
            rpc_url,
            pinata_jwt,
            pinata_api_url,
            artifact_path: value(ARTIFACT_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT_PATH)),
            base_uri: value(BASE_URI_VAR).unwrap_or_else(|| DEFAULT_BASE_URI.to_string()),
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { var, source })
}

/// Scheme and authority only. RPC providers put API keys in the path or
/// query, and userinfo may carry credentials.
pub fn redacted_url(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{host}:{port}", url.scheme()),
        (Some(host), None) => format!("{}://{host}", url.scheme()),
        _ => format!("{}:<redacted>", url.scheme()),
    }
}

// Keeps the key and the token out of logs.
impl fmt::Debug for ScriptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptConfig")
            .field("signer", &self.signer.address())
            .field("rpc_url", &redacted_url(&self.rpc_url))
            .field("pinata_jwt", &"<redacted>")
            .field("pinata_api_url", &redacted_url(&self.pinata_api_url))
            .field("artifact_path", &self.artifact_path)
            .field("base_uri", &self.base_uri)
            .finish()
    }
}
