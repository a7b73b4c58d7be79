use alloy::primitives::{address, Address, TxHash};
use helpers::{
    run_pipeline, ChainError, ConfigError, PinataClient, PinningError, PipelineError, ScriptConfig,
};
use reqwest::StatusCode;
use tests::{sample_artifact, spawn_pinning_stub, FixedPinner, RecordingChain, DEPLOY_TX};

const DEPLOYED: Address = address!("0x0000000000000000000000000000000000000abc");
const BASE_URI: &str = "ipfs://your-metadata-folder/";

#[tokio::test]
async fn test_pipeline_hands_values_through() -> anyhow::Result<()> {
    // Deploy yields the address, pinning yields QmXYZ, the recorder gets both exactly once
    let chain = RecordingChain::deploying_at(DEPLOYED);
    let pinner = FixedPinner::returning("QmXYZ");

    let outcome = run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI).await?;

    assert_eq!(outcome.contract_address, DEPLOYED);
    assert_eq!(outcome.content_hash, "QmXYZ");
    assert_eq!(outcome.deploy_tx, DEPLOY_TX);
    assert_eq!(outcome.record_tx, TxHash::repeat_byte(0xaa));
    assert_eq!(chain.deploys(), vec![BASE_URI.to_string()]);
    assert_eq!(pinner.names(), vec![DEPLOYED.to_checksum(None)]);
    assert_eq!(chain.records(), vec![(DEPLOYED, "QmXYZ".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_content_hash_is_not_transformed() -> anyhow::Result<()> {
    let odd_hash = " bafy-Mixed_Case/hash \n";
    let chain = RecordingChain::deploying_at(DEPLOYED);
    let pinner = FixedPinner::returning(odd_hash);

    run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI).await?;

    assert_eq!(chain.records(), vec![(DEPLOYED, odd_hash.to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_real_pinning_client_feeds_recorder() -> anyhow::Result<()> {
    let (url, server) = spawn_pinning_stub(200, r#"{"IpfsHash":"QmFromStub"}"#).await?;
    let chain = RecordingChain::deploying_at(DEPLOYED);
    let pinner = PinataClient::new(&url, "jwt")?;

    run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI).await?;

    let request = server.await??;
    assert_eq!(request.json()?["name"], DEPLOYED.to_checksum(None));
    assert_eq!(chain.records(), vec![(DEPLOYED, "QmFromStub".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_upload_failure_skips_recording() -> anyhow::Result<()> {
    let (url, server) = spawn_pinning_stub(500, r#"{"error":"boom"}"#).await?;
    let chain = RecordingChain::deploying_at(DEPLOYED);
    let pinner = PinataClient::new(&url, "jwt")?;

    let err = run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            PipelineError::Upload(PinningError::Status { status, .. })
                if status == StatusCode::INTERNAL_SERVER_ERROR
        ),
        "got {err:?}"
    );
    assert!(chain.records().is_empty());
    server.await??;
    Ok(())
}

#[tokio::test]
async fn test_deploy_failure_skips_later_stages() -> anyhow::Result<()> {
    let chain = RecordingChain::failing_deploy();
    let pinner = FixedPinner::returning("QmNever");

    let err = run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Deploy(ChainError::Reverted(_))));
    assert_eq!(err.to_string(), "contract deployment failed");
    assert!(pinner.names().is_empty());
    assert!(chain.records().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_record_failure_is_reported_as_record_stage() -> anyhow::Result<()> {
    let chain = RecordingChain::deploying_at(DEPLOYED).failing_record();
    let pinner = FixedPinner::returning("QmXYZ");

    let err = run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Record(ChainError::Reverted(_))));
    assert_eq!(chain.records().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_pinning_status_error_from_double() -> anyhow::Result<()> {
    let chain = RecordingChain::deploying_at(DEPLOYED);
    let pinner = FixedPinner::failing(StatusCode::FORBIDDEN);

    let err = run_pipeline(&chain, &pinner, &sample_artifact(), BASE_URI)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "pinning upload failed");
    assert!(chain.records().is_empty());
    Ok(())
}

#[test]
fn test_missing_configuration_stops_before_any_stage() {
    // configuration is built before any client exists, so nothing can be sent
    let err = ScriptConfig::from_lookup(|key| match key {
        "ALCHEMY_URL" => Some("http://127.0.0.1:8545".to_string()),
        _ => None,
    })
    .unwrap_err();

    match err {
        ConfigError::Missing(missing) => assert_eq!(missing, vec!["PRIVATE_KEY", "PINATA_JWT"]),
        other => panic!("unexpected error {other:?}"),
    }
}
