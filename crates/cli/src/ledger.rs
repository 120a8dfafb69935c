//! The operations the auction client needs from the ledger, and their RPC
//! implementation.

use std::fmt;

use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::client_error::Error as ClientError;
use solana_rpc_client_api::config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_rpc_client_api::filter::{Memcmp, RpcFilterType};
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger never saw or never answered the request.
    #[error("{0}")]
    Transport(String),

    /// The ledger processed and rejected the transaction.
    #[error("{0}")]
    Rejected(TransactionError),
}

impl From<ClientError> for LedgerError {
    fn from(err: ClientError) -> Self {
        match err.get_transaction_error() {
            Some(tx_err) => LedgerError::Rejected(tx_err),
            None => LedgerError::Transport(err.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Byte comparison against account data, used to narrow program account scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl AccountFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len())
            .map_or(false, |window| window == self.bytes.as_slice())
    }
}

/// Generic ledger interface for the auction client.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_latest_blockhash(&self) -> LedgerResult<Hash>;

    /// Submits a signed transaction and waits until the ledger confirms or
    /// rejects it.
    async fn send_transaction(&self, transaction: &Transaction) -> LedgerResult<Signature>;

    async fn get_account(&self, address: &Pubkey) -> LedgerResult<Option<Account>>;

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> LedgerResult<Vec<(Pubkey, Account)>>;
}

/// Ledger client over JSON-RPC.
pub struct RpcLedger {
    client: RpcClient,
}

impl fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcLedger")
            .field("url", &self.client.url())
            .finish()
    }
}

impl RpcLedger {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, commitment),
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn get_latest_blockhash(&self) -> LedgerResult<Hash> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> LedgerResult<Signature> {
        Ok(self.client.send_and_confirm_transaction(transaction).await?)
    }

    async fn get_account(&self, address: &Pubkey) -> LedgerResult<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> LedgerResult<Vec<(Pubkey, Account)>> {
        let filters = filters
            .iter()
            .map(|filter| {
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(filter.offset, &filter.bytes))
            })
            .collect();
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        Ok(self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await?)
    }
}
