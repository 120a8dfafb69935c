use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

/// Program ids the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    /// The blind auction program.
    pub program_id: Pubkey,
    /// The MPC network program that `close_auction` queues work with.
    pub arcium_program_id: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAuctionParams {
    /// Auctioneer-chosen sequence number, part of the auction address.
    pub auction_id: u64,
    pub title: String,
    pub description: String,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedAuction {
    pub address: Pubkey,
    pub bump: u8,
    pub signature: Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedBid {
    pub bid_record: Pubkey,
    pub bump: u8,
    pub signature: Signature,
}
