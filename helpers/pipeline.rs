//! deploy -> pin -> record, one stage after the other.

use alloy::primitives::{Address, TxHash};
use thiserror::Error;
use tracing::info;

use crate::{
    artifact::ContractArtifact,
    chain::{ChainError, ContractChain, Deployment},
    pinata::{PinningError, PinningService},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("contract deployment failed")]
    Deploy(#[source] ChainError),

    #[error("pinning upload failed")]
    Upload(#[source] PinningError),

    #[error("recording content hash failed")]
    Record(#[source] ChainError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub contract_address: Address,
    pub content_hash: String,
    pub deploy_tx: TxHash,
    pub record_tx: TxHash,
}

/// Runs the three stages in order. A failed stage stops the run, so later
/// stages never see a partial result.
pub async fn run_pipeline<C, P>(
    chain: &C,
    pinner: &P,
    artifact: &ContractArtifact,
    base_uri: &str,
) -> Result<PipelineOutcome, PipelineError>
where
    C: ContractChain + ?Sized,
    P: PinningService + ?Sized,
{
    info!(base_uri, "deploying contract");
    let Deployment {
        address: contract_address,
        tx_hash: deploy_tx,
    } = chain
        .deploy(artifact, base_uri)
        .await
        .map_err(PipelineError::Deploy)?;
    info!(%contract_address, %deploy_tx, "contract deployed");

    // the checksummed address doubles as the folder name
    info!("uploading empty folder to the pinning service");
    let content_hash = pinner
        .pin_empty_folder(&contract_address.to_string())
        .await
        .map_err(PipelineError::Upload)?;
    info!(%content_hash, "folder uploaded");

    info!("storing content hash on-chain");
    let record_tx = chain
        .store_content_hash(contract_address, &content_hash)
        .await
        .map_err(PipelineError::Record)?;
    info!(%record_tx, %content_hash, "content hash stored in contract");

    Ok(PipelineOutcome {
        contract_address,
        content_hash,
        deploy_tx,
        record_tx,
    })
}
