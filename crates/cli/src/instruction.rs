//! Instructions of the blind auction program that the client invokes.
//!
//! The program is an Anchor program: instruction data is the 8-byte sighash
//! `sha256("global:<name>")[..8]` followed by the Borsh-encoded arguments.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::hash::hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::error::{AuctionClientError, AuctionClientResult};
use crate::pda::ArciumAccounts;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Anchor discriminator of an instruction or account, `sha256("<namespace>:<name>")[..8]`.
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = hash(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest.to_bytes()[..DISCRIMINATOR_LEN]);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CreateAuctionArgs {
    pub auction_id: u64,
    pub title: String,
    pub description: String,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PlaceBidArgs {
    pub encrypted_bid: [u8; 64],
    pub bid_nonce: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuctionInstruction {
    /// Opens a new auction.
    ///   0. `[writable]` Auction account, derived from `["auction", auctioneer, auction_id]`.
    ///   1. `[writable, signer]` Auctioneer, pays for the account.
    ///   2. `[]` System program.
    CreateAuction(CreateAuctionArgs),

    /// Stores a sealed bid.
    ///   0. `[writable]` Auction account.
    ///   1. `[writable]` Bid record, derived from `["bid", auction, bidder]`.
    ///   2. `[writable, signer]` Bidder, pays for the record.
    ///   3. `[]` System program.
    PlaceBid(PlaceBidArgs),

    /// Ends bidding and queues winner selection on the MPC network.
    ///   0. `[writable]` Auction account.
    ///   1. `[writable, signer]` Caller.
    ///   2. `[]` MXE account.
    ///   3. `[writable]` Mempool.
    ///   4. `[writable]` Execution pool.
    ///   5. `[]` Cluster.
    ///   6. `[writable]` Encrypted instruction account.
    ///   7. `[]` Arcium program.
    ///   8. `[]` System program.
    CloseAuction,

    /// Claims a finalized auction.
    ///   0. `[]` Auction account.
    ///   1. `[signer]` Winner.
    ClaimWin,
}

impl AuctionInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            AuctionInstruction::CreateAuction(_) => "create_auction",
            AuctionInstruction::PlaceBid(_) => "place_bid",
            AuctionInstruction::CloseAuction => "close_auction",
            AuctionInstruction::ClaimWin => "claim_win",
        }
    }

    pub fn pack(&self) -> AuctionClientResult<Vec<u8>> {
        let mut data = discriminator("global", self.name()).to_vec();
        match self {
            AuctionInstruction::CreateAuction(args) => args.serialize(&mut data)?,
            AuctionInstruction::PlaceBid(args) => args.serialize(&mut data)?,
            AuctionInstruction::CloseAuction | AuctionInstruction::ClaimWin => {}
        }
        Ok(data)
    }

    pub fn unpack(data: &[u8]) -> AuctionClientResult<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(AuctionClientError::InvalidInput(
                "instruction data shorter than discriminator".to_string(),
            ));
        }
        let (tag, rest) = data.split_at(DISCRIMINATOR_LEN);
        let is = |name: &str| tag == discriminator("global", name);

        let instruction = if is("create_auction") {
            AuctionInstruction::CreateAuction(borsh::from_slice(rest)?)
        } else if is("place_bid") {
            AuctionInstruction::PlaceBid(borsh::from_slice(rest)?)
        } else if is("close_auction") && rest.is_empty() {
            AuctionInstruction::CloseAuction
        } else if is("claim_win") && rest.is_empty() {
            AuctionInstruction::ClaimWin
        } else {
            return Err(AuctionClientError::InvalidInput(format!(
                "unknown instruction {}",
                hex::encode(tag)
            )));
        };
        Ok(instruction)
    }
}

/// Creates a `create_auction` instruction.
pub fn create_auction(
    program_id: &Pubkey,
    auction: &Pubkey,
    auctioneer: &Pubkey,
    args: CreateAuctionArgs,
) -> AuctionClientResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*auction, false),
            AccountMeta::new(*auctioneer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: AuctionInstruction::CreateAuction(args).pack()?,
    })
}

/// Creates a `place_bid` instruction.
pub fn place_bid(
    program_id: &Pubkey,
    auction: &Pubkey,
    bid_record: &Pubkey,
    bidder: &Pubkey,
    args: PlaceBidArgs,
) -> AuctionClientResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*auction, false),
            AccountMeta::new(*bid_record, false),
            AccountMeta::new(*bidder, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: AuctionInstruction::PlaceBid(args).pack()?,
    })
}

/// Creates a `close_auction` instruction.
pub fn close_auction(
    program_id: &Pubkey,
    auction: &Pubkey,
    caller: &Pubkey,
    arcium_program_id: &Pubkey,
    encrypted_ix: &Pubkey,
) -> AuctionClientResult<Instruction> {
    let arcium = ArciumAccounts::derive(arcium_program_id);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*auction, false),
            AccountMeta::new(*caller, true),
            AccountMeta::new_readonly(arcium.mxe, false),
            AccountMeta::new(arcium.mempool, false),
            AccountMeta::new(arcium.execpool, false),
            AccountMeta::new_readonly(arcium.cluster, false),
            AccountMeta::new(*encrypted_ix, false),
            AccountMeta::new_readonly(*arcium_program_id, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: AuctionInstruction::CloseAuction.pack()?,
    })
}

/// Creates a `claim_win` instruction.
pub fn claim_win(
    program_id: &Pubkey,
    auction: &Pubkey,
    winner: &Pubkey,
) -> AuctionClientResult<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*auction, false),
            AccountMeta::new_readonly(*winner, true),
        ],
        data: AuctionInstruction::ClaimWin.pack()?,
    })
}
