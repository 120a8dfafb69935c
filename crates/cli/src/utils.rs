use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use home::home_dir;
use mpc_sdk::ConfiguredMxe;
use solana_sdk::signature::{read_keypair_file, Keypair};

use crate::auction::AuctionContext;
use crate::config::Config;
use crate::ledger::RpcLedger;

pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

/// Keypair path value that prompts for the secret key instead of reading a file.
pub const ASK_KEYPAIR: &str = "ASK";

pub fn setup_context(config: &Config) -> Result<AuctionContext<RpcLedger>> {
    let ledger = RpcLedger::new(config.chain.rpc_url.clone(), config.commitment()?);
    Ok(AuctionContext::new(ledger, config.program_ids()))
}

pub fn setup_mxe(config: &Config) -> Result<ConfiguredMxe> {
    ConfiguredMxe::from_hex(&config.mxe.public_key).context("Invalid MXE public key in config")
}

/// Loads a signer from a keypair file, or prompts for it when the path is
/// [`ASK_KEYPAIR`].
pub fn load_keypair(keypair_path: &str) -> Result<Keypair> {
    if keypair_path == ASK_KEYPAIR {
        let secret = rpassword::prompt_password("Enter keypair bytes (JSON array): ")
            .context("Failed to read keypair")?;
        return keypair_from_json(&secret);
    }
    let path = expand_home(keypair_path)?;
    read_keypair_file(&path).map_err(|e| anyhow!("Failed to read keypair from {:?}: {}", path, e))
}

pub fn keypair_from_json(value: &str) -> Result<Keypair> {
    let bytes: Vec<u8> =
        serde_json::from_str(value.trim()).context("Failed to parse keypair JSON")?;
    Keypair::from_bytes(&bytes).map_err(|e| anyhow!("Failed to create keypair from bytes: {}", e))
}

pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home_dir = home_dir().context("Failed to get home directory")?;
            Ok(home_dir.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
