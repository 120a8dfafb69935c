use std::str::FromStr;

use anyhow::{Context, Result};
use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::types::ProgramIds;

/// Program id of the deployed blind auction program.
pub const DEFAULT_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("7TY1q4ZJA9juVLcb9dfKAtoiiUwsDsfD8szRFm2cVW4x");
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Prefix of environment overrides, e.g. `BLIND_AUCTION__CHAIN__RPC_URL`.
const ENV_PREFIX: &str = "BLIND_AUCTION";

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProgramConfig {
    #[serde(deserialize_with = "pubkey_from_str", serialize_with = "pubkey_to_str")]
    pub program_id: Pubkey,
    #[serde(deserialize_with = "pubkey_from_str", serialize_with = "pubkey_to_str")]
    pub arcium_program_id: Pubkey,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct MxeConfig {
    /// Hex-encoded x25519 public key of the MXE cluster.
    pub public_key: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    pub program: ProgramConfig,
    pub mxe: MxeConfig,
}

impl Config {
    pub fn new(config_path: &str) -> Result<Config, config::ConfigError> {
        let content = ConfigLoader::builder()
            .add_source(File::new(config_path, FileFormat::Toml))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;
        let config: Config = content.try_deserialize::<Config>()?;

        Ok(config)
    }

    /// Config pointing at devnet, with the given MPC network program and key.
    pub fn template(arcium_program_id: Pubkey, mxe_public_key: String) -> Self {
        Config {
            chain: ChainConfig {
                rpc_url: DEFAULT_RPC_URL.to_string(),
                commitment: default_commitment(),
            },
            program: ProgramConfig {
                program_id: DEFAULT_PROGRAM_ID,
                arcium_program_id,
            },
            mxe: MxeConfig {
                public_key: mxe_public_key,
            },
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.chain.commitment)
            .map_err(|e| anyhow::anyhow!("Invalid commitment {:?}: {}", self.chain.commitment, e))
    }

    pub fn program_ids(&self) -> ProgramIds {
        ProgramIds {
            program_id: self.program.program_id,
            arcium_program_id: self.program.arcium_program_id,
        }
    }
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn pubkey_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
    let value = String::deserialize(deserializer)?;
    Pubkey::from_str(&value).map_err(serde::de::Error::custom)
}

fn pubkey_to_str<S: serde::Serializer>(pubkey: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&pubkey.to_string())
}
