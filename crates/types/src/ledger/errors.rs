//! Ledger error types

use thiserror::Error;

use crate::models::{Address, Amount, Token};

/// Ledger operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
	#[error("Insufficient balance of {token} for {account}: required {required}, available {available}")]
	InsufficientBalance {
		token: Token,
		account: Address,
		required: Amount,
		available: Amount,
	},

	#[error("Insufficient allowance of {token} from {owner} to {spender}: required {required}, available {available}")]
	InsufficientAllowance {
		token: Token,
		owner: Address,
		spender: Address,
		required: Amount,
		available: Amount,
	},

	#[error("Balance overflow for {token} held by {account}")]
	Overflow { token: Token, account: Address },

	#[error("Ledger commit conflict: {reason}")]
	Conflict { reason: String },
}

pub type LedgerResult<T> = Result<T, LedgerError>;
