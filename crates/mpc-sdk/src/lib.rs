//! Client side of the MPC execution environment (MXE) that evaluates sealed
//! auction bids.
//!
//! The cluster itself is remote: bids are sealed to its public key here and
//! only the cluster learns the winner. [`LocalCluster`] plays the cluster's
//! part on development networks and in tests.

use std::fmt;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

pub mod cipher;
pub mod local;

pub use local::LocalCluster;

/// Width of the sealed bid field stored in a bid record.
pub const CIPHERTEXT_LEN: usize = 64;
/// Width of the per-bid nonce stored in a bid record.
pub const NONCE_LEN: usize = 32;

#[derive(thiserror::Error, Debug)]
pub enum MpcError {
    #[error("MXE service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid MXE public key: {0}")]
    InvalidKey(String),

    #[error("failed to seal bid: {0}")]
    Encryption(String),

    #[error("failed to open sealed bid: {0}")]
    Decryption(String),

    #[error("no bids to evaluate")]
    NoBids,
}

pub type MpcResult<T> = Result<T, MpcError>;

/// x25519 public key of the MXE cluster.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MxePublicKey(pub [u8; 32]);

impl MxePublicKey {
    pub fn from_hex(value: &str) -> MpcResult<Self> {
        let bytes = hex::decode(value.trim().trim_start_matches("0x"))
            .map_err(|e| MpcError::InvalidKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| {
                MpcError::InvalidKey(format!("expected 32 bytes, got {}", b.len()))
            })?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for MxePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MxePublicKey({})", self.to_hex())
    }
}

/// Single-use nonce submitted alongside a sealed bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidNonce(pub [u8; NONCE_LEN]);

impl BidNonce {
    /// Draws a fresh nonce from the operating system RNG.
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut bytes = [0u8; NONCE_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Sealed bid amount in the fixed on-chain layout.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BidCiphertext(pub [u8; CIPHERTEXT_LEN]);

impl fmt::Debug for BidCiphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BidCiphertext({})", hex::encode(self.0))
    }
}

/// A bid as the cluster sees it: who placed it and what was sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBid {
    pub bidder: Pubkey,
    pub ciphertext: BidCiphertext,
    pub nonce: BidNonce,
}

/// Access to the MXE public key and the bid sealing capability.
#[async_trait]
pub trait MxeClient: Send + Sync {
    /// Current public key of the cluster.
    async fn get_mxe_public_key(&self) -> MpcResult<MxePublicKey>;

    /// Seals `amount` to `key` under `nonce`.
    fn encrypt(
        &self,
        amount: u64,
        key: &MxePublicKey,
        nonce: &BidNonce,
    ) -> MpcResult<BidCiphertext>;
}

/// Winner selection over sealed bids, performed by the cluster.
#[async_trait]
pub trait WinnerComputation: Send + Sync {
    async fn compute_winner(&self, bids: &[SealedBid]) -> MpcResult<Pubkey>;
}

/// MXE client whose public key comes from configuration.
#[derive(Debug, Clone)]
pub struct ConfiguredMxe {
    public_key: MxePublicKey,
}

impl ConfiguredMxe {
    pub fn new(public_key: MxePublicKey) -> Self {
        Self { public_key }
    }

    pub fn from_hex(value: &str) -> MpcResult<Self> {
        Ok(Self::new(MxePublicKey::from_hex(value)?))
    }
}

#[async_trait]
impl MxeClient for ConfiguredMxe {
    async fn get_mxe_public_key(&self) -> MpcResult<MxePublicKey> {
        Ok(self.public_key)
    }

    fn encrypt(
        &self,
        amount: u64,
        key: &MxePublicKey,
        nonce: &BidNonce,
    ) -> MpcResult<BidCiphertext> {
        cipher::seal(amount, key, nonce)
    }
}
