//! Deploys the NFT contract, pins a placeholder folder named after it and
//! stores the returned content hash in the contract.

use std::process::ExitCode;

use anyhow::Context;
use helpers::{run_pipeline, setup_script, ContractArtifact, ScriptConfig, ScriptSetup};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> anyhow::Result<()> {
    // config first: a missing variable must stop us before any network call
    let config = ScriptConfig::from_env().context("invalid configuration")?;
    info!(?config, "configuration loaded");

    let artifact = ContractArtifact::load(&config.artifact_path).await?;

    let ScriptSetup { chain, pinner } = setup_script(&config)?;
    info!(sender = %chain.sender(), "using signer");

    let outcome = run_pipeline(&chain, &pinner, &artifact, &config.base_uri).await?;

    info!(
        contract = %outcome.contract_address,
        ipfs_hash = %outcome.content_hash,
        deploy_tx = %outcome.deploy_tx,
        record_tx = %outcome.record_tx,
        "run complete"
    );
    Ok(())
}
