//! Marketplace indexer runner.
//!
//! Streams the event log of one marketplace deployment and folds it into the
//! selected read model (stateful projection or raw event log), block by
//! block, starting from the deployment block.

mod config;

use std::{pin::pin, process::exit};

use alloy::providers::{Provider, ProviderBuilder};
use alloy_sol_types::SolEventInterface;
use clap::Parser;
use futures::StreamExt;
use market_indexer::{
    Chain, ContractVersion,
    abi::{v1::Marketplace::MarketplaceEvents, v2::MarketplaceV2::MarketplaceV2Events},
    error::MarketError,
    log, state,
    store::MemoryStore,
    stream,
    types::StateInstant,
};
use tracing::{error, info};
use url::Url;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match config::EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = config::CliConfig::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse the marketplace address
    let marketplace_address = match env_config.marketplace_address() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid marketplace address: {}", e);
            exit(1);
        }
    };

    // Parse RPC URL
    let node_url = match Url::parse(&env_config.node_rpc_url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Invalid RPC URL: {}", e);
            exit(1);
        }
    };

    let provider = match ProviderBuilder::new().connect(node_url.as_str()).await {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Failed to connect to {}: {}", node_url, e);
            exit(1);
        }
    };

    let version = match cli_config.contract {
        config::Contract::V1 => ContractVersion::V1,
        config::Contract::V2 => ContractVersion::V2,
    };
    let chain = Chain::custom(
        env_config.chain_id,
        marketplace_address,
        env_config.deployed_at_block,
        version,
    );
    let from = StateInstant::new(
        cli_config.from_block.unwrap_or(chain.deployed_at_block()),
        0,
    );

    info!(
        chain_id = chain.chain_id(),
        marketplace = %chain.marketplace(),
        from_block = from.block_number(),
        contract = ?cli_config.contract,
        strategy = ?cli_config.strategy,
        "starting indexer"
    );

    let result = match (cli_config.contract, cli_config.strategy) {
        (config::Contract::V1, config::Strategy::Projection) => {
            let mut projection = state::v1::Projection::new(MemoryStore::new());
            run::<MarketplaceEvents, _, _>(&chain, provider, from, move |block| {
                projection.apply_events(block)
            })
            .await
        }
        (config::Contract::V1, config::Strategy::Log) => {
            let mut recorder = log::v1::Recorder::new(MemoryStore::new());
            run::<MarketplaceEvents, _, _>(&chain, provider, from, move |block| {
                recorder.apply_events(block)
            })
            .await
        }
        (config::Contract::V2, config::Strategy::Projection) => {
            let mut projection = state::v2::Projection::new(MemoryStore::new());
            run::<MarketplaceV2Events, _, _>(&chain, provider, from, move |block| {
                projection.apply_events(block)
            })
            .await
        }
        (config::Contract::V2, config::Strategy::Log) => {
            let mut recorder = log::v2::Recorder::new(MemoryStore::new());
            run::<MarketplaceV2Events, _, _>(&chain, provider, from, move |block| {
                recorder.apply_events(block)
            })
            .await
        }
    };

    if let Err(e) = result {
        error!(%e, "Indexer encountered an error, shutting down");
        exit(1);
    }
}

/// Drives the event stream into the selected pipeline until the stream ends
/// or an error surfaces.
async fn run<E, P, F>(
    chain: &Chain,
    provider: P,
    from: StateInstant,
    mut apply: F,
) -> Result<(), MarketError>
where
    E: SolEventInterface,
    P: Provider,
    F: FnMut(&stream::RawBlockEvents<E>) -> Result<(), MarketError>,
{
    let mut blocks = pin!(stream::raw::<E, _, _, _>(
        chain,
        provider,
        from,
        tokio::time::sleep
    ));
    while let Some(block) = blocks.next().await {
        let block = block?;
        apply(&block)?;
        if !block.events().is_empty() {
            info!(
                block = block.instant().block_number(),
                events = block.events().len(),
                "indexed block"
            );
        }
    }
    Ok(())
}
