//! Trading venue abstraction
//!
//! A venue is the external exchange an adapter talks to: it quotes and
//! executes exact-input trades along an [`EncodedPath`].

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::ledger::{Ledger, LedgerError};
use crate::models::{Address, Amount, EncodedPath, FeeTier, PathError, Token};

/// Venue operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
	#[error("No pool for {token_a}/{token_b} at fee tier {fee}")]
	PoolNotFound {
		token_a: Token,
		token_b: Token,
		fee: FeeTier,
	},

	#[error("Insufficient liquidity swapping {token_in} for {token_out}")]
	InsufficientLiquidity { token_in: Token, token_out: Token },

	#[error("Malformed path: {0}")]
	MalformedPath(#[from] PathError),

	#[error("Arithmetic overflow while pricing {token_in} -> {token_out}")]
	Overflow { token_in: Token, token_out: Token },

	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

pub type VenueResult<T> = Result<T, VenueError>;

/// Quoter and swap router of one external venue
#[async_trait]
pub trait Venue: Send + Sync + Debug {
	fn name(&self) -> &str;

	/// Output of an exact-input trade along `path` without executing it
	async fn quote_exact_input(&self, path: &EncodedPath, amount_in: Amount)
		-> VenueResult<Amount>;

	/// Execute an exact-input trade along `path`
	///
	/// Pulls `amount_in` of the first token from `payer` and sends the output
	/// of the last token to `recipient`. All movements go through `ledger`.
	async fn exact_input(
		&self,
		ledger: &dyn Ledger,
		payer: &Address,
		path: &EncodedPath,
		amount_in: Amount,
		recipient: &Address,
	) -> VenueResult<Amount>;
}
