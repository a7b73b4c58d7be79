//! Deployment and on-chain recording through an EVM JSON-RPC endpoint.

use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::{DynProvider, PendingTransactionError, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol,
    sol_types::SolCall,
    transports::TransportError,
};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    artifact::ContractArtifact,
    config::{redacted_url, ScriptConfig},
};

sol! {
    function storeIPFSHash(string ipfsHash) external;
}

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC request failed")]
    Rpc(#[from] TransportError),

    #[error("waiting for the transaction receipt failed")]
    PendingTransaction(#[from] PendingTransactionError),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("deployment receipt for {0} carries no contract address")]
    MissingContractAddress(TxHash),
}

/// A confirmed contract deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
}

/// The two on-chain operations of a run.
#[async_trait]
pub trait ContractChain: Send + Sync {
    /// Deploys the artifact with `base_uri` as constructor argument and
    /// returns the address and transaction hash from the confirmed receipt.
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        base_uri: &str,
    ) -> Result<Deployment, ChainError>;

    /// Calls `storeIPFSHash(content_hash)` on `contract` and waits for the receipt.
    async fn store_content_hash(
        &self,
        contract: Address,
        content_hash: &str,
    ) -> Result<TxHash, ChainError>;
}

/// HTTP provider with a local signer, held for the whole run.
pub struct EvmChain {
    provider: DynProvider,
    sender: Address,
}

impl EvmChain {
    pub fn connect(config: &ScriptConfig) -> Self {
        let sender = config.signer.address();
        let wallet = EthereumWallet::from(config.signer.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(config.rpc_url.clone())
            .erased();
        debug!(rpc = %redacted_url(&config.rpc_url), %sender, "connected EVM provider");
        Self { provider, sender }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    async fn send_and_confirm(
        &self,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ChainError> {
        let pending = self.provider.send_transaction(tx).await?;
        debug!(tx_hash = %pending.tx_hash(), "transaction submitted");
        let receipt = pending.get_receipt().await?;
        ensure_succeeded(receipt)
    }
}

fn deploy_request(
    sender: Address,
    artifact: &ContractArtifact,
    base_uri: &str,
) -> TransactionRequest {
    TransactionRequest::default()
        .with_from(sender)
        .with_deploy_code(artifact.deploy_code(base_uri))
}

fn store_request(sender: Address, contract: Address, content_hash: &str) -> TransactionRequest {
    let call = storeIPFSHashCall {
        ipfsHash: content_hash.to_string(),
    };
    TransactionRequest::default()
        .with_from(sender)
        .with_to(contract)
        .with_input(call.abi_encode())
}

fn ensure_succeeded(receipt: TransactionReceipt) -> Result<TransactionReceipt, ChainError> {
    if !ReceiptResponse::status(&receipt) {
        return Err(ChainError::Reverted(receipt.transaction_hash));
    }
    Ok(receipt)
}

fn deployment_from_receipt(receipt: &TransactionReceipt) -> Result<Deployment, ChainError> {
    let address = receipt
        .contract_address
        .ok_or(ChainError::MissingContractAddress(receipt.transaction_hash))?;
    Ok(Deployment {
        address,
        tx_hash: receipt.transaction_hash,
    })
}

#[async_trait]
impl ContractChain for EvmChain {
    async fn deploy(
        &self,
        artifact: &ContractArtifact,
        base_uri: &str,
    ) -> Result<Deployment, ChainError> {
        let receipt = self
            .send_and_confirm(deploy_request(self.sender, artifact, base_uri))
            .await?;
        let deployment = deployment_from_receipt(&receipt)?;
        info!(
            tx_hash = %deployment.tx_hash,
            address = %deployment.address,
            "deployment confirmed"
        );
        Ok(deployment)
    }

    async fn store_content_hash(
        &self,
        contract: Address,
        content_hash: &str,
    ) -> Result<TxHash, ChainError> {
        let receipt = self
            .send_and_confirm(store_request(self.sender, contract, content_hash))
            .await?;
        info!(tx_hash = %receipt.transaction_hash, %contract, "content hash recorded");
        Ok(receipt.transaction_hash)
    }
}
