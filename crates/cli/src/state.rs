//! Accounts owned by the blind auction program.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};
use mpc_sdk::{BidCiphertext, BidNonce, SealedBid};
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;

use crate::error::{AuctionClientError, AuctionClientResult};
use crate::instruction::{discriminator, DISCRIMINATOR_LEN};

pub const MAX_TITLE_LEN: usize = 64;
pub const MAX_DESCRIPTION_LEN: usize = 256;

/// Offset of `BidRecord::auction` inside the account data.
pub const BID_RECORD_AUCTION_OFFSET: usize = DISCRIMINATOR_LEN;

/// Status as stored on chain. `Computing` is the closed phase, `Finalized`
/// carries the winner and is the settled phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AuctionStatus {
    Open,
    Computing,
    Finalized,
    Cancelled,
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuctionStatus::Open => "open",
            AuctionStatus::Computing => "closed (winner computation running)",
            AuctionStatus::Finalized => "settled",
            AuctionStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AuctionAccount {
    pub auction_id: u64,
    pub auctioneer: Pubkey,
    pub title: String,
    pub description: String,
    pub start_time: i64,
    pub end_time: i64,
    pub status: AuctionStatus,
    pub bid_count: u32,
    pub winner: Option<Pubkey>,
    pub computation_proof: [u8; 32],
    pub bump: u8,
}

impl AuctionAccount {
    /// Space the program allocates for the account, discriminator included.
    pub const LEN: usize = 8
        + 8
        + 32
        + (4 + MAX_TITLE_LEN)
        + (4 + MAX_DESCRIPTION_LEN)
        + 8
        + 8
        + 1
        + 4
        + (1 + 32)
        + 32
        + 1;

    pub fn is_open_at(&self, unix_timestamp: i64) -> bool {
        self.status == AuctionStatus::Open && unix_timestamp < self.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct BidRecord {
    pub auction: Pubkey,
    pub bidder: Pubkey,
    pub encrypted_bid: [u8; 64],
    pub bid_nonce: [u8; 32],
    pub timestamp: i64,
    pub bump: u8,
}

impl BidRecord {
    pub const LEN: usize = 8 + 32 + 32 + 64 + 32 + 8 + 1;

    pub fn sealed_bid(&self) -> SealedBid {
        SealedBid {
            bidder: self.bidder,
            ciphertext: BidCiphertext(self.encrypted_bid),
            nonce: BidNonce(self.bid_nonce),
        }
    }
}

/// An account type of the auction program, stored as an 8-byte account
/// discriminator followed by its Borsh encoding.
pub trait ProgramAccount: BorshSerialize + BorshDeserialize {
    const NAME: &'static str;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", Self::NAME)
    }

    /// Decodes `account` found at `address`, checking owner and discriminator.
    fn from_account(
        program_id: &Pubkey,
        address: &Pubkey,
        account: &Account,
    ) -> AuctionClientResult<Self> {
        if account.owner != *program_id {
            return Err(AuctionClientError::InvalidAccountData(
                *address,
                format!("owned by {}, expected {}", account.owner, program_id),
            ));
        }
        Self::unpack(&account.data)
            .map_err(|e| AuctionClientError::InvalidAccountData(*address, e.to_string()))
    }

    fn unpack(data: &[u8]) -> std::io::Result<Self> {
        if data.len() < DISCRIMINATOR_LEN || data[..DISCRIMINATOR_LEN] != Self::discriminator() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("not a {} account", Self::NAME),
            ));
        }
        // Accounts are allocated at full size; trailing bytes are zero.
        Self::deserialize(&mut &data[DISCRIMINATOR_LEN..])
    }

    fn pack(&self) -> std::io::Result<Vec<u8>> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

impl ProgramAccount for AuctionAccount {
    const NAME: &'static str = "AuctionAccount";
}

impl ProgramAccount for BidRecord {
    const NAME: &'static str = "BidRecord";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auction() -> AuctionAccount {
        AuctionAccount {
            auction_id: 1,
            auctioneer: Pubkey::new_unique(),
            title: "t".repeat(MAX_TITLE_LEN),
            description: "d".repeat(MAX_DESCRIPTION_LEN),
            start_time: 1_700_000_000,
            end_time: 1_700_003_600,
            status: AuctionStatus::Open,
            bid_count: 0,
            winner: Some(Pubkey::new_unique()),
            computation_proof: [0u8; 32],
            bump: 254,
        }
    }

    #[test]
    fn test_auction_fits_allocated_space() {
        let data = auction().pack().unwrap();
        assert_eq!(data.len(), AuctionAccount::LEN);
    }

    #[test]
    fn test_decode_padded_account() {
        let program_id = Pubkey::new_unique();
        let expected = auction();
        let mut data = AuctionAccount {
            title: "short".to_string(),
            ..expected.clone()
        }
        .pack()
        .unwrap();
        data.resize(AuctionAccount::LEN, 0);

        let account = Account {
            lamports: 1,
            data,
            owner: program_id,
            executable: false,
            rent_epoch: 0,
        };
        let decoded =
            AuctionAccount::from_account(&program_id, &Pubkey::new_unique(), &account).unwrap();
        assert_eq!(decoded.title, "short");
        assert_eq!(decoded.winner, expected.winner);
    }

    #[test]
    fn test_decode_checks_owner_and_type() {
        let program_id = Pubkey::new_unique();
        let record = BidRecord {
            auction: Pubkey::new_unique(),
            bidder: Pubkey::new_unique(),
            encrypted_bid: [3u8; 64],
            bid_nonce: [4u8; 32],
            timestamp: 5,
            bump: 255,
        };
        let data = record.pack().unwrap();
        assert_eq!(data.len(), BidRecord::LEN);
        assert_eq!(
            &data[BID_RECORD_AUCTION_OFFSET..BID_RECORD_AUCTION_OFFSET + 32],
            record.auction.as_ref()
        );

        let mut account = Account {
            lamports: 1,
            data,
            owner: Pubkey::new_unique(),
            executable: false,
            rent_epoch: 0,
        };
        let address = Pubkey::new_unique();
        assert!(matches!(
            BidRecord::from_account(&program_id, &address, &account),
            Err(AuctionClientError::InvalidAccountData(a, _)) if a == address
        ));

        account.owner = program_id;
        assert_eq!(BidRecord::from_account(&program_id, &address, &account).unwrap(), record);
        assert!(AuctionAccount::from_account(&program_id, &address, &account).is_err());
    }

    #[test]
    fn test_is_open_at() {
        let auction = auction();
        assert!(auction.is_open_at(auction.end_time - 1));
        assert!(!auction.is_open_at(auction.end_time));
        let closed = AuctionAccount {
            status: AuctionStatus::Computing,
            ..auction
        };
        assert!(!closed.is_open_at(closed.start_time));
    }
}
