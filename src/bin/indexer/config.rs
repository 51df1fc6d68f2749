//! Configuration for the indexer runner.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): connection details
//! - CLI arguments: contract revision and indexing strategy

use alloy::primitives::Address;
use clap::{Parser, ValueEnum};

/// Environment configuration (connection details).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Chain ID (e.g. 898 for the deployment network's testnet)
    pub chain_id: u64,

    /// Marketplace contract address
    pub marketplace_address: String,

    /// Block number when the marketplace was deployed
    pub deployed_at_block: u64,

    /// RPC URL for the node
    pub node_rpc_url: String,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the marketplace address.
    pub fn marketplace_address(&self) -> Result<Address, alloy::primitives::hex::FromHexError> {
        self.marketplace_address.parse()
    }
}

/// Marketplace contract revision to index.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Contract {
    V1,
    V2,
}

/// Indexing strategy to run.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Strategy {
    /// Stateful projection: configuration singleton, trade records,
    /// hour/day/month statistics
    Projection,
    /// Raw event log: one immutable record per event
    Log,
}

/// CLI arguments for the indexer runner.
#[derive(Debug, Parser)]
#[command(name = "indexer")]
#[command(about = "Event indexer for the NFT marketplace contract")]
pub struct CliConfig {
    /// Contract revision deployed at the configured address
    #[arg(long, value_enum)]
    pub contract: Contract,

    /// Indexing strategy
    #[arg(long, value_enum, default_value = "projection")]
    pub strategy: Strategy,

    /// Start block; defaults to the deployment block from the environment
    #[arg(long)]
    pub from_block: Option<u64>,
}
