//! Error types for adapter operations

use thiserror::Error;

use crate::ledger::LedgerError;
use crate::models::{Address, Amount, PathError, Token};
use crate::venue::VenueError;

/// Adapter operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
	#[error("Adapter {adapter_id} has no fee tier for {token_a}/{token_b}")]
	UnknownPair {
		adapter_id: String,
		token_a: Token,
		token_b: Token,
	},

	#[error("Invalid path: {reason}")]
	InvalidPath { reason: String },

	#[error("Deadline {deadline} passed (now {now})")]
	Expired { deadline: u64, now: u64 },

	#[error("Output {actual} below minimum {required}")]
	InsufficientOutput { required: Amount, actual: Amount },

	#[error("Transfer failed: {0}")]
	TransferFailed(LedgerError),

	#[error("Caller {caller} is not the owner of adapter {adapter_id}")]
	Unauthorized { caller: Address, adapter_id: String },

	#[error("Invalid adapter configuration: {reason}")]
	InvalidConfiguration { reason: String },

	#[error("Venue error: {0}")]
	Venue(#[from] VenueError),

	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

impl From<PathError> for AdapterError {
	fn from(error: PathError) -> Self {
		AdapterError::InvalidPath {
			reason: error.to_string(),
		}
	}
}

impl AdapterError {
	/// True for failures that only mean "this candidate path is not routable"
	pub fn is_unroutable(&self) -> bool {
		matches!(
			self,
			AdapterError::UnknownPair { .. }
				| AdapterError::InvalidPath { .. }
				| AdapterError::Venue(VenueError::PoolNotFound { .. })
				| AdapterError::Venue(VenueError::InsufficientLiquidity { .. })
		)
	}
}

pub type AdapterResult<T> = Result<T, AdapterError>;
