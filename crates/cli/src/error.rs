use mpc_sdk::MpcError;
use solana_sdk::instruction::InstructionError;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signer::SignerError;
use solana_sdk::transaction::TransactionError;

use crate::ledger::LedgerError;

/// First custom error code of the auction program's error enum.
pub const PROGRAM_ERROR_OFFSET: u32 = 6000;

/// System program error raised when creating an account that already exists.
const ACCOUNT_ALREADY_IN_USE: u32 = 0;

/// Errors raised by the auction program, in declaration order.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Title too long")]
    TitleTooLong,
    #[error("Description too long")]
    DescriptionTooLong,
    #[error("Invalid duration")]
    InvalidDuration,
    #[error("Auction not open")]
    AuctionNotOpen,
    #[error("Auction expired")]
    AuctionExpired,
    #[error("Already bid")]
    AlreadyBid,
    #[error("Auction still active")]
    AuctionStillActive,
    #[error("No bids placed")]
    NoBids,
    #[error("Unauthorized finalizer")]
    UnauthorizedFinalizer,
    #[error("Invalid state")]
    InvalidState,
    #[error("Auction not finalized")]
    AuctionNotFinalized,
    #[error("Not the winner")]
    NotTheWinner,
}

impl ProgramError {
    const ALL: [ProgramError; 12] = [
        ProgramError::TitleTooLong,
        ProgramError::DescriptionTooLong,
        ProgramError::InvalidDuration,
        ProgramError::AuctionNotOpen,
        ProgramError::AuctionExpired,
        ProgramError::AlreadyBid,
        ProgramError::AuctionStillActive,
        ProgramError::NoBids,
        ProgramError::UnauthorizedFinalizer,
        ProgramError::InvalidState,
        ProgramError::AuctionNotFinalized,
        ProgramError::NotTheWinner,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        let index = code.checked_sub(PROGRAM_ERROR_OFFSET)?;
        Self::ALL.get(index as usize).copied()
    }

    pub fn code(self) -> u32 {
        PROGRAM_ERROR_OFFSET + self as u32
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AuctionClientError {
    #[error("rejected by the auction program: {0}")]
    Program(ProgramError),

    #[error("account {0} already exists")]
    AccountAlreadyExists(Pubkey),

    #[error("transaction rejected: {0}")]
    Rejected(TransactionError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("encryption service error: {0}")]
    Encryption(#[from] MpcError),

    #[error("account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("invalid data in account {0}: {1}")]
    InvalidAccountData(Pubkey, String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("signing failed: {0}")]
    Signing(#[from] SignerError),

    #[error("serialization error: {0}")]
    Serialization(#[from] std::io::Error),
}

pub type AuctionClientResult<T> = Result<T, AuctionClientError>;

impl AuctionClientError {
    /// Classifies a ledger failure. `created` is the derived account the
    /// transaction tried to create, if any.
    pub fn from_ledger(err: LedgerError, created: Option<Pubkey>) -> Self {
        match err {
            LedgerError::Transport(message) => AuctionClientError::Transport(message),
            LedgerError::Rejected(tx_err) => Self::from_transaction_error(tx_err, created),
        }
    }

    fn from_transaction_error(tx_err: TransactionError, created: Option<Pubkey>) -> Self {
        let custom_code = match &tx_err {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
            _ => None,
        };
        match (custom_code, created) {
            (Some(code), _) if code >= PROGRAM_ERROR_OFFSET => ProgramError::from_code(code)
                .map_or(AuctionClientError::Rejected(tx_err), AuctionClientError::Program),
            (Some(ACCOUNT_ALREADY_IN_USE), Some(address)) => {
                AuctionClientError::AccountAlreadyExists(address)
            }
            _ => AuctionClientError::Rejected(tx_err),
        }
    }

    /// The program error behind this failure, if it is a precondition failure.
    pub fn program_error(&self) -> Option<ProgramError> {
        match self {
            AuctionClientError::Program(err) => Some(*err),
            _ => None,
        }
    }
}
