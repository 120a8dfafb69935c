//! Program-derived addresses used by the blind auction program.

use solana_sdk::pubkey::Pubkey;

pub const AUCTION_SEED: &[u8] = b"auction";
pub const BID_SEED: &[u8] = b"bid";

pub const MXE_SEED: &[u8] = b"mxe";
pub const MEMPOOL_SEED: &[u8] = b"mempool";
pub const EXECPOOL_SEED: &[u8] = b"execpool";
pub const CLUSTER_SEED: &[u8] = b"cluster";

/// Derives the auction account address and bump seed for an auctioneer's
/// `auction_id`. The id enters the seeds as 8 little-endian bytes.
pub fn derive_auction_address(
    program_id: &Pubkey,
    auctioneer: &Pubkey,
    auction_id: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[AUCTION_SEED, auctioneer.as_ref(), &auction_id.to_le_bytes()],
        program_id,
    )
}

/// Derives the bid record address and bump seed of `bidder` in `auction`.
pub fn derive_bid_address(program_id: &Pubkey, auction: &Pubkey, bidder: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[BID_SEED, auction.as_ref(), bidder.as_ref()], program_id)
}

/// Checks an `(address, bump)` pair received from someone else.
pub fn verify_auction_address(
    program_id: &Pubkey,
    auctioneer: &Pubkey,
    auction_id: u64,
    address: &Pubkey,
    bump: u8,
) -> bool {
    Pubkey::create_program_address(
        &[AUCTION_SEED, auctioneer.as_ref(), &auction_id.to_le_bytes(), &[bump]],
        program_id,
    )
    .map_or(false, |derived| derived == *address)
}

pub fn verify_bid_address(
    program_id: &Pubkey,
    auction: &Pubkey,
    bidder: &Pubkey,
    address: &Pubkey,
    bump: u8,
) -> bool {
    Pubkey::create_program_address(
        &[BID_SEED, auction.as_ref(), bidder.as_ref(), &[bump]],
        program_id,
    )
    .map_or(false, |derived| derived == *address)
}

/// Accounts of the MPC network that `close_auction` queues work into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArciumAccounts {
    pub mxe: Pubkey,
    pub mempool: Pubkey,
    pub execpool: Pubkey,
    pub cluster: Pubkey,
}

impl ArciumAccounts {
    pub fn derive(arcium_program_id: &Pubkey) -> Self {
        let (mxe, _) = Pubkey::find_program_address(&[MXE_SEED], arcium_program_id);
        let under_mxe =
            |seed: &[u8]| Pubkey::find_program_address(&[seed, mxe.as_ref()], arcium_program_id).0;
        Self {
            mxe,
            mempool: under_mxe(MEMPOOL_SEED),
            execpool: under_mxe(EXECPOOL_SEED),
            cluster: under_mxe(CLUSTER_SEED),
        }
    }
}
