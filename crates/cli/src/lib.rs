//! Client for the blind auction program: sealed bids are encrypted to the MPC
//! network before they reach the ledger, and the winner is computed there
//! without revealing any amount.

pub mod auction;
pub mod config;
pub mod error;
pub mod instruction;
pub mod ledger;
pub mod pda;
pub mod state;
pub mod types;
pub mod utils;
