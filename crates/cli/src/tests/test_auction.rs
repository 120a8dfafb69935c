#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use mpc_sdk::{
        BidCiphertext, BidNonce, LocalCluster, MpcError, MpcResult, MxeClient, MxePublicKey,
    };
    use solana_sdk::account::Account;
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::signature::Keypair;
    use solana_sdk::signer::Signer;

    use crate::auction::{
        claim_win, close_auction, create_auction, find_auction, get_auction, get_bid_record,
        list_bids, place_bid, sealed_bids, AuctionContext,
    };
    use crate::error::{AuctionClientError, ProgramError};
    use crate::pda::{derive_auction_address, derive_bid_address};
    use crate::state::AuctionStatus;
    use crate::tests::mock_ledger::{MockLedger, GENESIS_TIMESTAMP};
    use crate::types::{CreateAuctionParams, ProgramIds};

    const DURATION: u64 = 3600;

    /// MXE client whose cluster cannot be reached.
    struct OfflineMxe;

    #[async_trait]
    impl MxeClient for OfflineMxe {
        async fn get_mxe_public_key(&self) -> MpcResult<MxePublicKey> {
            Err(MpcError::Unavailable("cluster offline".to_string()))
        }

        fn encrypt(
            &self,
            _amount: u64,
            _key: &MxePublicKey,
            _nonce: &BidNonce,
        ) -> MpcResult<BidCiphertext> {
            Err(MpcError::Unavailable("cluster offline".to_string()))
        }
    }

    fn setup() -> AuctionContext<MockLedger> {
        let program_ids = ProgramIds {
            program_id: Pubkey::new_unique(),
            arcium_program_id: Pubkey::new_unique(),
        };
        AuctionContext::new(MockLedger::new(program_ids.program_id), program_ids)
    }

    fn params(auction_id: u64) -> CreateAuctionParams {
        CreateAuctionParams {
            auction_id,
            title: "Vintage watch".to_string(),
            description: "Sealed-bid sale, highest bid wins".to_string(),
            duration_seconds: DURATION,
        }
    }

    async fn open_auction(ctx: &AuctionContext<MockLedger>, auctioneer: &Keypair) -> Pubkey {
        create_auction(ctx, auctioneer, params(1)).await.unwrap().address
    }

    fn assert_program_error<T: std::fmt::Debug>(
        result: Result<T, AuctionClientError>,
        expected: ProgramError,
    ) {
        match result {
            Err(err) => assert_eq!(err.program_error(), Some(expected), "{err}"),
            Ok(value) => panic!("expected {expected:?}, got {value:?}"),
        }
    }

    #[tokio::test]
    async fn test_auction_lifecycle() {
        let ctx = setup();
        let cluster = LocalCluster::generate();
        let auctioneer = Keypair::new();
        let bidder = Keypair::new();

        // Create
        let created = create_auction(&ctx, &auctioneer, params(1)).await.unwrap();
        let (expected, bump) = derive_auction_address(ctx.program_id(), &auctioneer.pubkey(), 1);
        assert_eq!(created.address, expected);
        assert_eq!(created.bump, bump);

        let auction = get_auction(&ctx, &created.address).await.unwrap();
        assert_eq!(auction.status, AuctionStatus::Open);
        assert_eq!(auction.auctioneer, auctioneer.pubkey());
        assert_eq!(auction.bid_count, 0);
        assert_eq!(auction.start_time, GENESIS_TIMESTAMP);
        assert_eq!(auction.end_time - auction.start_time, DURATION as i64);
        assert_eq!(auction.winner, None);

        // Bid
        let amount = 1_000u64;
        let placed = place_bid(&ctx, &cluster, &bidder, &created.address, amount)
            .await
            .unwrap();
        let (expected_record, _) =
            derive_bid_address(ctx.program_id(), &created.address, &bidder.pubkey());
        assert_eq!(placed.bid_record, expected_record);

        let record = get_bid_record(&ctx, &placed.bid_record).await.unwrap();
        assert_eq!(record.auction, created.address);
        assert_eq!(record.bidder, bidder.pubkey());
        assert!(!record
            .encrypted_bid
            .windows(8)
            .any(|window| window == amount.to_le_bytes()));
        assert_eq!(cluster.open(&record.sealed_bid()).unwrap(), amount);
        assert_eq!(get_auction(&ctx, &created.address).await.unwrap().bid_count, 1);

        // Closing early is refused
        assert_program_error(
            close_auction(&ctx, &auctioneer, &created.address, &Pubkey::new_unique()).await,
            ProgramError::AuctionStillActive,
        );

        ctx.ledger.advance_clock(DURATION as i64);
        close_auction(&ctx, &auctioneer, &created.address, &Pubkey::new_unique())
            .await
            .unwrap();
        assert_eq!(
            get_auction(&ctx, &created.address).await.unwrap().status,
            AuctionStatus::Computing
        );

        // Claiming before the MPC callback lands is refused
        assert_program_error(
            claim_win(&ctx, &bidder, &created.address).await,
            ProgramError::AuctionNotFinalized,
        );

        let winner = ctx.ledger.finalize(&created.address, &cluster).await.unwrap();
        assert_eq!(winner, bidder.pubkey());
        let settled = get_auction(&ctx, &created.address).await.unwrap();
        assert_eq!(settled.status, AuctionStatus::Finalized);
        assert_eq!(settled.winner, Some(bidder.pubkey()));

        assert_program_error(
            claim_win(&ctx, &auctioneer, &created.address).await,
            ProgramError::NotTheWinner,
        );
        claim_win(&ctx, &bidder, &created.address).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_auction_rejected() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let address = open_auction(&ctx, &auctioneer).await;

        let result = create_auction(&ctx, &auctioneer, params(1)).await;
        assert!(matches!(result, Err(AuctionClientError::AccountAlreadyExists(a)) if a == address));

        // Another id from the same auctioneer is a different auction
        let other = create_auction(&ctx, &auctioneer, params(2)).await.unwrap();
        assert_ne!(other.address, address);
    }

    #[tokio::test]
    async fn test_second_bid_from_same_bidder_rejected() {
        let ctx = setup();
        let cluster = LocalCluster::generate();
        let auctioneer = Keypair::new();
        let bidder = Keypair::new();
        let auction = open_auction(&ctx, &auctioneer).await;

        let first = place_bid(&ctx, &cluster, &bidder, &auction, 10).await.unwrap();
        let result = place_bid(&ctx, &cluster, &bidder, &auction, 20).await;
        assert!(matches!(
            result,
            Err(AuctionClientError::AccountAlreadyExists(a)) if a == first.bid_record
        ));

        assert_eq!(get_auction(&ctx, &auction).await.unwrap().bid_count, 1);
        let record = get_bid_record(&ctx, &first.bid_record).await.unwrap();
        assert_eq!(cluster.open(&record.sealed_bid()).unwrap(), 10);
    }

    #[tokio::test]
    async fn test_bid_outside_bidding_window_rejected() {
        let ctx = setup();
        let cluster = LocalCluster::generate();
        let auctioneer = Keypair::new();
        let auction = open_auction(&ctx, &auctioneer).await;
        place_bid(&ctx, &cluster, &Keypair::new(), &auction, 5)
            .await
            .unwrap();

        ctx.ledger.advance_clock(DURATION as i64);
        assert_program_error(
            place_bid(&ctx, &cluster, &Keypair::new(), &auction, 5).await,
            ProgramError::AuctionExpired,
        );

        close_auction(&ctx, &auctioneer, &auction, &Pubkey::new_unique())
            .await
            .unwrap();
        assert_program_error(
            place_bid(&ctx, &cluster, &Keypair::new(), &auction, 5).await,
            ProgramError::AuctionNotOpen,
        );
        assert_program_error(
            close_auction(&ctx, &auctioneer, &auction, &Pubkey::new_unique()).await,
            ProgramError::AuctionNotOpen,
        );
    }

    #[tokio::test]
    async fn test_close_without_bids_rejected() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let auction = open_auction(&ctx, &auctioneer).await;
        ctx.ledger.advance_clock(DURATION as i64 + 1);

        assert_program_error(
            close_auction(&ctx, &auctioneer, &auction, &Pubkey::new_unique()).await,
            ProgramError::NoBids,
        );
    }

    #[tokio::test]
    async fn test_highest_sealed_bid_wins() {
        let ctx = setup();
        let cluster = LocalCluster::generate();
        let auctioneer = Keypair::new();
        let auction = open_auction(&ctx, &auctioneer).await;

        let bidders = [Keypair::new(), Keypair::new(), Keypair::new()];
        for (bidder, amount) in bidders.iter().zip([300u64, 900, 500]) {
            place_bid(&ctx, &cluster, bidder, &auction, amount)
                .await
                .unwrap();
            ctx.ledger.advance_clock(10);
        }

        let bids = list_bids(&ctx, &auction).await.unwrap();
        let listed: Vec<Pubkey> = bids.iter().map(|(_, record)| record.bidder).collect();
        let expected: Vec<Pubkey> = bidders.iter().map(|bidder| bidder.pubkey()).collect();
        assert_eq!(listed, expected);

        let sealed = sealed_bids(&ctx, &auction).await.unwrap();
        assert_eq!(sealed.len(), 3);
        assert_eq!(cluster.open(&sealed[1]).unwrap(), 900);

        ctx.ledger.advance_clock(DURATION as i64);
        close_auction(&ctx, &bidders[0], &auction, &Pubkey::new_unique())
            .await
            .unwrap();
        let winner = ctx.ledger.finalize(&auction, &cluster).await.unwrap();
        assert_eq!(winner, bidders[1].pubkey());

        for loser in [&bidders[0], &bidders[2]] {
            assert_program_error(
                claim_win(&ctx, loser, &auction).await,
                ProgramError::NotTheWinner,
            );
        }
        claim_win(&ctx, &bidders[1], &auction).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_bids_is_scoped_to_auction() {
        let ctx = setup();
        let cluster = LocalCluster::generate();
        let auctioneer = Keypair::new();
        let bidder = Keypair::new();
        let first = open_auction(&ctx, &auctioneer).await;
        let second = create_auction(&ctx, &auctioneer, params(2))
            .await
            .unwrap()
            .address;

        place_bid(&ctx, &cluster, &bidder, &first, 1).await.unwrap();
        place_bid(&ctx, &cluster, &bidder, &second, 2).await.unwrap();
        place_bid(&ctx, &cluster, &Keypair::new(), &second, 3)
            .await
            .unwrap();

        assert_eq!(list_bids(&ctx, &first).await.unwrap().len(), 1);
        assert_eq!(list_bids(&ctx, &second).await.unwrap().len(), 2);
        assert!(list_bids(&ctx, &Pubkey::new_unique()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_submitted() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let mut bad = params(1);
        bad.title = "x".repeat(65);

        let result = create_auction(&ctx, &auctioneer, bad).await;
        assert!(matches!(result, Err(AuctionClientError::InvalidInput(_))));

        let (address, _) = derive_auction_address(ctx.program_id(), &auctioneer.pubkey(), 1);
        assert!(matches!(
            get_auction(&ctx, &address).await,
            Err(AuctionClientError::AccountNotFound(a)) if a == address
        ));
    }

    #[tokio::test]
    async fn test_find_auction_by_auctioneer_and_id() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let address = open_auction(&ctx, &auctioneer).await;

        let (found, auction) = find_auction(&ctx, &auctioneer.pubkey(), 1).await.unwrap();
        assert_eq!(found, address);
        assert_eq!(auction.auction_id, 1);
        assert_eq!(auction.title, "Vintage watch");

        assert!(matches!(
            find_auction(&ctx, &auctioneer.pubkey(), 2).await,
            Err(AuctionClientError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_foreign_account_rejected() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let address = open_auction(&ctx, &auctioneer).await;
        let mut account = ctx.ledger.account(&address).unwrap();
        account.owner = Pubkey::new_unique();

        let impostor = Pubkey::new_unique();
        ctx.ledger.insert_account(impostor, account);
        assert!(matches!(
            get_auction(&ctx, &impostor).await,
            Err(AuctionClientError::InvalidAccountData(a, _)) if a == impostor
        ));

        ctx.ledger.insert_account(
            impostor,
            Account {
                lamports: 1,
                data: vec![0u8; 16],
                owner: *ctx.program_id(),
                executable: false,
                rent_epoch: 0,
            },
        );
        assert!(matches!(
            get_auction(&ctx, &impostor).await,
            Err(AuctionClientError::InvalidAccountData(..))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        ctx.ledger.set_offline(true);

        let result = create_auction(&ctx, &auctioneer, params(1)).await;
        assert!(matches!(result, Err(AuctionClientError::Transport(_))));

        ctx.ledger.set_offline(false);
        let created = create_auction(&ctx, &auctioneer, params(1)).await.unwrap();
        let auction = get_auction(&ctx, &created.address).await.unwrap();
        assert_eq!(auction.title, "Vintage watch");
    }

    #[tokio::test]
    async fn test_unavailable_mxe_submits_nothing() {
        let ctx = setup();
        let auctioneer = Keypair::new();
        let bidder = Keypair::new();
        let auction = open_auction(&ctx, &auctioneer).await;

        let result = place_bid(&ctx, &OfflineMxe, &bidder, &auction, 100).await;
        assert!(matches!(
            result,
            Err(AuctionClientError::Encryption(MpcError::Unavailable(_)))
        ));

        let (record, _) = derive_bid_address(ctx.program_id(), &auction, &bidder.pubkey());
        assert!(matches!(
            get_bid_record(&ctx, &record).await,
            Err(AuctionClientError::AccountNotFound(a)) if a == record
        ));
        assert_eq!(get_auction(&ctx, &auction).await.unwrap().bid_count, 0);
    }
}
