//! Compiled contract artifacts produced by the Solidity toolchain.

use std::path::{Path, PathBuf};

use alloy::{
    json_abi::{JsonAbi, Param},
    primitives::Bytes,
    sol_types::SolValue,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Name of the method that records the content hash on-chain.
pub const STORE_METHOD: &str = "storeIPFSHash";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read contract artifact {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("contract artifact is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("contract artifact has empty bytecode")]
    EmptyBytecode,

    #[error("contract artifact has no `constructor(string)`")]
    MissingConstructor,

    #[error("contract artifact has no `storeIPFSHash(string)` function")]
    MissingStoreMethod,
}

/// The part of an artifact the deployment needs: interface and creation code.
#[derive(Clone, Debug, Deserialize)]
pub struct ContractArtifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub async fn load(path: &Path) -> Result<Self, ArtifactError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let artifact = Self::from_json(&raw)?;
        debug!(
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "loaded contract artifact"
        );
        Ok(artifact)
    }

    /// Parses and validates an artifact. Extra keys are ignored.
    pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode);
        }
        let constructor_ok = self
            .abi
            .constructor()
            .is_some_and(|constructor| takes_single_string(&constructor.inputs));
        if !constructor_ok {
            return Err(ArtifactError::MissingConstructor);
        }
        let store_ok = self
            .abi
            .function(STORE_METHOD)
            .is_some_and(|overloads| overloads.iter().any(|f| takes_single_string(&f.inputs)));
        if !store_ok {
            return Err(ArtifactError::MissingStoreMethod);
        }
        Ok(())
    }

    /// Creation code followed by the ABI-encoded `baseURI` constructor argument.
    pub fn deploy_code(&self, base_uri: &str) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&(base_uri.to_string(),).abi_encode_params());
        code.into()
    }
}

fn takes_single_string(inputs: &[Param]) -> bool {
    matches!(inputs, [param] if param.ty == "string")
}
