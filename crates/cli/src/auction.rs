use mpc_sdk::{BidNonce, MxeClient, SealedBid};
use solana_sdk::instruction::Instruction;
use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info};

use crate::error::{AuctionClientError, AuctionClientResult};
use crate::instruction::{self, CreateAuctionArgs, PlaceBidArgs};
use crate::ledger::{AccountFilter, Ledger};
use crate::pda::{derive_auction_address, derive_bid_address};
use crate::state::{
    AuctionAccount, BidRecord, ProgramAccount, BID_RECORD_AUCTION_OFFSET, MAX_DESCRIPTION_LEN,
    MAX_TITLE_LEN,
};
use crate::types::{CreateAuctionParams, CreatedAuction, PlacedBid, ProgramIds};

/// Everything a lifecycle call needs besides the signer: the ledger to talk to
/// and the program ids to address.
#[derive(Debug)]
pub struct AuctionContext<L> {
    pub ledger: L,
    pub program_ids: ProgramIds,
}

impl<L: Ledger> AuctionContext<L> {
    pub fn new(ledger: L, program_ids: ProgramIds) -> Self {
        Self {
            ledger,
            program_ids,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_ids.program_id
    }
}

/// Creates a new auction.
///
/// # Arguments
///
/// * `ctx` - Ledger and program ids.
/// * `auctioneer` - Signer that owns the auction and pays for its account.
/// * `params` - Sequence number, title, description and bidding duration.
///
/// # Returns
///
/// The derived auction address, its bump and the transaction signature. The
/// ledger rejects the call if an auction already lives at that address.
pub async fn create_auction<L: Ledger>(
    ctx: &AuctionContext<L>,
    auctioneer: &dyn Signer,
    params: CreateAuctionParams,
) -> AuctionClientResult<CreatedAuction> {
    let duration_seconds = validate_params(&params)?;
    let (address, bump) =
        derive_auction_address(ctx.program_id(), &auctioneer.pubkey(), params.auction_id);

    let ix = instruction::create_auction(
        ctx.program_id(),
        &address,
        &auctioneer.pubkey(),
        CreateAuctionArgs {
            auction_id: params.auction_id,
            title: params.title,
            description: params.description,
            duration_seconds,
        },
    )?;
    let signature = submit(ctx, ix, auctioneer, Some(address)).await?;
    info!(
        auction = %address,
        auction_id = params.auction_id,
        %signature,
        "auction created"
    );
    Ok(CreatedAuction {
        address,
        bump,
        signature,
    })
}

/// Places a sealed bid on an auction.
///
/// # Arguments
///
/// * `ctx` - Ledger and program ids.
/// * `mxe` - MPC service that provides the cluster key and seals the amount.
/// * `bidder` - Signer placing the bid; one bid per bidder per auction.
/// * `auction` - Address of the auction.
/// * `amount` - Bid amount in lamports. Only its sealed form leaves this function.
pub async fn place_bid<L, M>(
    ctx: &AuctionContext<L>,
    mxe: &M,
    bidder: &dyn Signer,
    auction: &Pubkey,
    amount: u64,
) -> AuctionClientResult<PlacedBid>
where
    L: Ledger,
    M: MxeClient + ?Sized,
{
    let key = mxe.get_mxe_public_key().await?;
    let nonce = BidNonce::generate();
    let ciphertext = mxe.encrypt(amount, &key, &nonce)?;
    debug!(%auction, "bid sealed");

    let (bid_record, bump) = derive_bid_address(ctx.program_id(), auction, &bidder.pubkey());
    let ix = instruction::place_bid(
        ctx.program_id(),
        auction,
        &bid_record,
        &bidder.pubkey(),
        PlaceBidArgs {
            encrypted_bid: ciphertext.0,
            bid_nonce: nonce.0,
        },
    )?;
    let signature = submit(ctx, ix, bidder, Some(bid_record)).await?;
    info!(%auction, %bid_record, %signature, "sealed bid submitted");
    Ok(PlacedBid {
        bid_record,
        bump,
        signature,
    })
}

/// Closes bidding once the deadline has passed and hands the sealed bids to
/// the MPC network for winner selection.
///
/// `encrypted_ix` is the computation account on the MPC network that receives
/// the queued instruction.
pub async fn close_auction<L: Ledger>(
    ctx: &AuctionContext<L>,
    caller: &dyn Signer,
    auction: &Pubkey,
    encrypted_ix: &Pubkey,
) -> AuctionClientResult<Signature> {
    let ix = instruction::close_auction(
        ctx.program_id(),
        auction,
        &caller.pubkey(),
        &ctx.program_ids.arcium_program_id,
        encrypted_ix,
    )?;
    let signature = submit(ctx, ix, caller, None).await?;
    info!(%auction, %signature, "auction closed, winner computation queued");
    Ok(signature)
}

/// Claims a settled auction. Only the computed winner succeeds.
pub async fn claim_win<L: Ledger>(
    ctx: &AuctionContext<L>,
    winner: &dyn Signer,
    auction: &Pubkey,
) -> AuctionClientResult<Signature> {
    let ix = instruction::claim_win(ctx.program_id(), auction, &winner.pubkey())?;
    let signature = submit(ctx, ix, winner, None).await?;
    info!(%auction, winner = %winner.pubkey(), %signature, "win claimed");
    Ok(signature)
}

/// Fetches and decodes the auction account at `address`.
pub async fn get_auction<L: Ledger>(
    ctx: &AuctionContext<L>,
    address: &Pubkey,
) -> AuctionClientResult<AuctionAccount> {
    fetch(ctx, address).await
}

/// Fetches the auction `auction_id` of `auctioneer`.
pub async fn find_auction<L: Ledger>(
    ctx: &AuctionContext<L>,
    auctioneer: &Pubkey,
    auction_id: u64,
) -> AuctionClientResult<(Pubkey, AuctionAccount)> {
    let (address, _) = derive_auction_address(ctx.program_id(), auctioneer, auction_id);
    Ok((address, fetch(ctx, &address).await?))
}

/// Fetches and decodes the bid record at `address`.
pub async fn get_bid_record<L: Ledger>(
    ctx: &AuctionContext<L>,
    address: &Pubkey,
) -> AuctionClientResult<BidRecord> {
    fetch(ctx, address).await
}

/// Lists every bid record of `auction`, oldest first.
pub async fn list_bids<L: Ledger>(
    ctx: &AuctionContext<L>,
    auction: &Pubkey,
) -> AuctionClientResult<Vec<(Pubkey, BidRecord)>> {
    let filters = [
        AccountFilter::new(0, BidRecord::discriminator()),
        AccountFilter::new(BID_RECORD_AUCTION_OFFSET, auction.to_bytes()),
    ];
    let accounts = ctx
        .ledger
        .get_program_accounts(ctx.program_id(), &filters)
        .await
        .map_err(|e| AuctionClientError::from_ledger(e, None))?;

    let mut bids = accounts
        .iter()
        .map(|(address, account)| {
            BidRecord::from_account(ctx.program_id(), address, account)
                .map(|record| (*address, record))
        })
        .collect::<AuctionClientResult<Vec<_>>>()?;
    bids.sort_by_key(|(address, record)| (record.timestamp, *address));
    Ok(bids)
}

/// The bids of `auction` as the MPC network evaluates them.
pub async fn sealed_bids<L: Ledger>(
    ctx: &AuctionContext<L>,
    auction: &Pubkey,
) -> AuctionClientResult<Vec<SealedBid>> {
    Ok(list_bids(ctx, auction)
        .await?
        .iter()
        .map(|(_, record)| record.sealed_bid())
        .collect())
}

async fn fetch<L: Ledger, T: ProgramAccount>(
    ctx: &AuctionContext<L>,
    address: &Pubkey,
) -> AuctionClientResult<T> {
    let account = ctx
        .ledger
        .get_account(address)
        .await
        .map_err(|e| AuctionClientError::from_ledger(e, None))?
        .ok_or(AuctionClientError::AccountNotFound(*address))?;
    T::from_account(ctx.program_id(), address, &account)
}

fn validate_params(params: &CreateAuctionParams) -> AuctionClientResult<i64> {
    if params.title.len() > MAX_TITLE_LEN {
        return Err(AuctionClientError::InvalidInput(format!(
            "title is {} bytes, at most {} allowed",
            params.title.len(),
            MAX_TITLE_LEN
        )));
    }
    if params.description.len() > MAX_DESCRIPTION_LEN {
        return Err(AuctionClientError::InvalidInput(format!(
            "description is {} bytes, at most {} allowed",
            params.description.len(),
            MAX_DESCRIPTION_LEN
        )));
    }
    match i64::try_from(params.duration_seconds) {
        Ok(duration) if duration > 0 => Ok(duration),
        _ => Err(AuctionClientError::InvalidInput(format!(
            "duration must be between 1 and {} seconds",
            i64::MAX
        ))),
    }
}

/// Signs `ix` as a single-instruction transaction paid by `signer` and waits
/// for the ledger's verdict. `created` names the derived account the
/// instruction initializes, so a collision there is reported as such.
async fn submit<L: Ledger>(
    ctx: &AuctionContext<L>,
    ix: Instruction,
    signer: &dyn Signer,
    created: Option<Pubkey>,
) -> AuctionClientResult<Signature> {
    let blockhash = ctx
        .ledger
        .get_latest_blockhash()
        .await
        .map_err(|e| AuctionClientError::from_ledger(e, None))?;

    let mut transaction = Transaction::new_with_payer(&[ix], Some(&signer.pubkey()));
    transaction.try_sign(&[signer], blockhash)?;

    let size = bincode::serialized_size(&transaction)
        .map_err(|e| AuctionClientError::InvalidInput(e.to_string()))?;
    if size > PACKET_DATA_SIZE as u64 {
        return Err(AuctionClientError::InvalidInput(format!(
            "transaction is {size} bytes, over the {PACKET_DATA_SIZE} byte limit"
        )));
    }

    ctx.ledger
        .send_transaction(&transaction)
        .await
        .map_err(|e| AuctionClientError::from_ledger(e, created))
}
