//! Common helper functions for scripts and tests

pub mod artifact;
pub mod chain;
pub mod config;
pub mod pinata;
pub mod pipeline;

pub use artifact::{ArtifactError, ContractArtifact};
pub use chain::{ChainError, ContractChain, Deployment, EvmChain};
pub use config::{ConfigError, ScriptConfig};
pub use pinata::{PinataClient, PinningError, PinningService};
pub use pipeline::{run_pipeline, PipelineError, PipelineOutcome};

/// Clients a script run talks to
pub struct ScriptSetup {
    pub chain: EvmChain,
    pub pinner: PinataClient,
}

/// Build the chain and pinning clients from the configuration.
///
/// Nothing here touches the network; the provider and the HTTP client
/// connect lazily on the first request.
pub fn setup_script(config: &ScriptConfig) -> Result<ScriptSetup, PinningError> {
    let chain = EvmChain::connect(config);
    let pinner = PinataClient::from_config(config)?;
    Ok(ScriptSetup { chain, pinner })
}
