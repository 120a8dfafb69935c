use std::path::Path;

use anyhow::{bail, Context, Result};
use blind_auction::auction::{
    claim_win, close_auction, create_auction, find_auction, get_auction, list_bids, place_bid,
};
use blind_auction::config::Config;
use blind_auction::pda::{derive_auction_address, derive_bid_address};
use blind_auction::state::{AuctionAccount, BidRecord};
use blind_auction::types::CreateAuctionParams;
use blind_auction::utils::{load_keypair, setup_context, setup_mxe, DEFAULT_KEYPAIR_PATH};
use chrono::{DateTime, Utc};
use clap::CommandFactory;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::Signer;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blind-auction")]
#[command(about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[clap(short, long)]
    version: bool,
    #[clap(short, long, default_value = "config.toml")]
    config_path: String,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
enum Commands {
    /// Print current version
    Version,
    /// Write a config file pointing at devnet
    InitConfig {
        #[arg(long)]
        arcium_program_id: Pubkey,
        #[arg(long)]
        mxe_public_key: String,
        #[arg(long)]
        force: bool,
    },
    /// Print the address of an auction
    AuctionAddress {
        #[arg(long)]
        auctioneer: Pubkey,
        #[arg(long)]
        auction_id: u64,
    },
    /// Print the bid record address of a bidder
    BidAddress {
        #[arg(long)]
        auction: Pubkey,
        #[arg(long)]
        bidder: Pubkey,
    },
    /// Create auction session
    CreateAuction {
        #[arg(long)]
        auction_id: u64,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Bidding window in seconds
        #[arg(long, default_value = "3600")]
        duration: u64,
        #[clap(short, long, default_value = DEFAULT_KEYPAIR_PATH)]
        keypair_path: String,
    },
    /// Get detail of an auction, by address or by auctioneer and id
    GetAuction {
        #[arg(long, conflicts_with_all = ["auctioneer", "auction_id"])]
        auction: Option<Pubkey>,
        #[arg(long, requires = "auction_id")]
        auctioneer: Option<Pubkey>,
        #[arg(long, requires = "auctioneer")]
        auction_id: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// List the sealed bids of an auction
    ListBids {
        #[arg(long)]
        auction: Pubkey,
        #[arg(long)]
        json: bool,
    },
    /// Place a sealed bid
    Bid {
        #[arg(long)]
        auction: Pubkey,
        /// Amount in lamports, sealed before it leaves this machine
        #[arg(long)]
        amount: u64,
        #[clap(short, long, default_value = DEFAULT_KEYPAIR_PATH)]
        keypair_path: String,
    },
    /// Close bidding and queue winner computation
    CloseAuction {
        #[arg(long)]
        auction: Pubkey,
        /// Computation account on the MPC network
        #[arg(long)]
        encrypted_ix: Pubkey,
        #[clap(short, long, default_value = DEFAULT_KEYPAIR_PATH)]
        keypair_path: String,
    },
    /// Claim a settled auction
    ClaimWin {
        #[arg(long)]
        auction: Pubkey,
        #[clap(short, long, default_value = DEFAULT_KEYPAIR_PATH)]
        keypair_path: String,
    },
}

#[derive(Serialize)]
struct AuctionView {
    address: String,
    auction_id: u64,
    auctioneer: String,
    title: String,
    description: String,
    start_time: String,
    end_time: String,
    status: String,
    accepting_bids: bool,
    bid_count: u32,
    winner: Option<String>,
}

impl AuctionView {
    fn new(address: &Pubkey, auction: &AuctionAccount) -> Self {
        Self {
            address: address.to_string(),
            auction_id: auction.auction_id,
            auctioneer: auction.auctioneer.to_string(),
            title: auction.title.clone(),
            description: auction.description.clone(),
            start_time: format_timestamp(auction.start_time),
            end_time: format_timestamp(auction.end_time),
            status: auction.status.to_string(),
            accepting_bids: auction.is_open_at(Utc::now().timestamp()),
            bid_count: auction.bid_count,
            winner: auction.winner.map(|winner| winner.to_string()),
        }
    }
}

#[derive(Serialize)]
struct BidView {
    address: String,
    bidder: String,
    timestamp: String,
    encrypted_bid: String,
    bid_nonce: String,
}

impl BidView {
    fn new(address: &Pubkey, record: &BidRecord) -> Self {
        Self {
            address: address.to_string(),
            bidder: record.bidder.to_string(),
            timestamp: format_timestamp(record.timestamp),
            encrypted_bid: hex::encode(record.encrypted_bid),
            bid_nonce: hex::encode(record.bid_nonce),
        }
    }
}

fn format_timestamp(unix_timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_timestamp, 0)
        .map_or_else(|| unix_timestamp.to_string(), |time| time.to_rfc3339())
}

fn print_auction(view: &AuctionView) {
    println!("------------------------------------");
    println!("Auction: {}", view.address);
    println!("Id: {}", view.auction_id);
    println!("Auctioneer: {}", view.auctioneer);
    println!("Title: {}", view.title);
    println!("Description: {}", view.description);
    println!("Bidding: {} -> {}", view.start_time, view.end_time);
    println!("Status: {}", view.status);
    println!("Accepting bids: {}", view.accepting_bids);
    println!("Bids: {}", view.bid_count);
    match &view.winner {
        Some(winner) => println!("Winner: {}", winner),
        None => println!("Winner: -"),
    }
    println!("------------------------------------");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();

    if args.version {
        println!(env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(command) = args.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match &command {
        Commands::Version => {
            println!(env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::InitConfig {
            arcium_program_id,
            mxe_public_key,
            force,
        } => {
            if Path::new(&args.config_path).exists() && !force {
                bail!("{} already exists, pass --force to overwrite", args.config_path);
            }
            let config = Config::template(*arcium_program_id, mxe_public_key.clone());
            std::fs::write(&args.config_path, config.to_toml()?)
                .with_context(|| format!("Failed to write {}", args.config_path))?;
            println!("Config written to {}", args.config_path);
            return Ok(());
        }
        _ => {}
    }

    let config = Config::new(&args.config_path)
        .with_context(|| format!("Failed to load config from {:?}", &args.config_path))?;
    let ctx = setup_context(&config)?;

    match command {
        Commands::AuctionAddress {
            auctioneer,
            auction_id,
        } => {
            let (address, bump) = derive_auction_address(ctx.program_id(), &auctioneer, auction_id);
            println!("Auction address: {} (bump {})", address, bump);
        }
        Commands::BidAddress { auction, bidder } => {
            let (address, bump) = derive_bid_address(ctx.program_id(), &auction, &bidder);
            println!("Bid address: {} (bump {})", address, bump);
        }
        Commands::CreateAuction {
            auction_id,
            title,
            description,
            duration,
            keypair_path,
        } => {
            let auctioneer = load_keypair(&keypair_path)?;
            let created = create_auction(
                &ctx,
                &auctioneer,
                CreateAuctionParams {
                    auction_id,
                    title,
                    description,
                    duration_seconds: duration,
                },
            )
            .await
            .context("Failed to create auction")?;
            println!("Auction created: {}", created.address);
            println!("Transaction: {}", created.signature);
        }
        Commands::GetAuction {
            auction,
            auctioneer,
            auction_id,
            json,
        } => {
            let (address, account) = match (auction, auctioneer, auction_id) {
                (Some(address), ..) => (address, get_auction(&ctx, &address).await?),
                (None, Some(auctioneer), Some(auction_id)) => {
                    find_auction(&ctx, &auctioneer, auction_id).await?
                }
                _ => bail!("Pass --auction, or --auctioneer with --auction-id"),
            };
            let view = AuctionView::new(&address, &account);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_auction(&view);
            }
        }
        Commands::ListBids { auction, json } => {
            let bids = list_bids(&ctx, &auction)
                .await
                .with_context(|| format!("Failed to list bids of {}", auction))?;
            let views: Vec<BidView> = bids
                .iter()
                .map(|(address, record)| BidView::new(address, record))
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                println!("Total bids: {}", views.len());
                for view in views {
                    println!("------------------------------------");
                    println!("Bidder: {}", view.bidder);
                    println!("Record: {}", view.address);
                    println!("Placed at: {}", view.timestamp);
                }
            }
        }
        Commands::Bid {
            auction,
            amount,
            keypair_path,
        } => {
            let bidder = load_keypair(&keypair_path)?;
            let mxe = setup_mxe(&config)?;
            let placed = place_bid(&ctx, &mxe, &bidder, &auction, amount)
                .await
                .with_context(|| format!("Failed to bid on auction {}", auction))?;
            println!("Sealed bid stored at: {}", placed.bid_record);
            println!("Transaction: {}", placed.signature);
        }
        Commands::CloseAuction {
            auction,
            encrypted_ix,
            keypair_path,
        } => {
            let caller = load_keypair(&keypair_path)?;
            let signature = close_auction(&ctx, &caller, &auction, &encrypted_ix)
                .await
                .with_context(|| format!("Failed to close auction {}", auction))?;
            println!("Auction closed, winner computation queued");
            println!("Transaction: {}", signature);
        }
        Commands::ClaimWin {
            auction,
            keypair_path,
        } => {
            let winner = load_keypair(&keypair_path)?;
            let signature = claim_win(&ctx, &winner, &auction)
                .await
                .with_context(|| format!("Failed to claim auction {}", auction))?;
            println!("Auction {} claimed by {}", auction, winner.pubkey());
            println!("Transaction: {}", signature);
        }
        Commands::Version | Commands::InitConfig { .. } => {}
    }
    Ok(())
}
