use std::fmt;

use async_trait::async_trait;
use curve25519_dalek::montgomery::MontgomeryPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::{
    cipher, BidCiphertext, BidNonce, MpcError, MpcResult, MxeClient, MxePublicKey, SealedBid,
    WinnerComputation,
};

/// In-process stand-in for the MXE cluster. Holds the cluster secret, so it
/// can open bids; only use it where that is acceptable.
pub struct LocalCluster {
    secret: [u8; 32],
    public_key: MxePublicKey,
}

impl LocalCluster {
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        let public_key = MxePublicKey(MontgomeryPoint::mul_base_clamped(secret).to_bytes());
        Self { secret, public_key }
    }

    pub fn public_key(&self) -> MxePublicKey {
        self.public_key
    }

    pub fn open(&self, bid: &SealedBid) -> MpcResult<u64> {
        cipher::open(&self.secret, &bid.ciphertext, &bid.nonce)
    }
}

impl fmt::Debug for LocalCluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCluster")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MxeClient for LocalCluster {
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

#[async_trait]
impl WinnerComputation for LocalCluster {
    /// Highest amount wins; on a tie the earliest bid in `bids` keeps the lead.
    async fn compute_winner(&self, bids: &[SealedBid]) -> MpcResult<Pubkey> {
        let mut winner: Option<(Pubkey, u64)> = None;
        for bid in bids {
            let amount = self.open(bid)?;
            match winner {
                Some((_, best)) if amount <= best => {}
                _ => winner = Some((bid.bidder, amount)),
            }
        }
        let (bidder, _) = winner.ok_or(MpcError::NoBids)?;
        debug!(%bidder, bids = bids.len(), "winner computed");
        Ok(bidder)
    }
}
