//! Router-level error type surfaced to callers

use thiserror::Error;

use crate::adapters::AdapterError;
use crate::ledger::LedgerError;
use crate::models::{Address, Amount, Token};

/// Errors returned by the path finder and swap executor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
	#[error("Caller {caller} is not authorized to {operation}")]
	Unauthorized { caller: Address, operation: String },

	#[error("Invalid configuration: {reason}")]
	InvalidConfiguration { reason: String },

	#[error("No route from {token_in} to {target} within {max_hops} hops")]
	NoRouteFound {
		token_in: Token,
		target: Token,
		max_hops: usize,
	},

	#[error("Output {actual} below minimum {required}")]
	InsufficientOutput { required: Amount, actual: Amount },

	#[error("Deadline {deadline} passed (now {now})")]
	Expired { deadline: u64, now: u64 },

	#[error("Transfer failed: {0}")]
	TransferFailed(LedgerError),

	#[error("No fee tier registered for {token_a}/{token_b}")]
	UnknownPair { token_a: Token, token_b: Token },

	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Attached value {value} does not match {expected}")]
	InvalidValue { value: Amount, expected: Amount },

	#[error("Adapter error: {0}")]
	Adapter(AdapterError),
}

impl RouterError {
	pub fn unauthorized(caller: Address, operation: impl Into<String>) -> Self {
		Self::Unauthorized {
			caller,
			operation: operation.into(),
		}
	}

	pub fn invalid_configuration(reason: impl Into<String>) -> Self {
		Self::InvalidConfiguration {
			reason: reason.into(),
		}
	}
}

impl From<AdapterError> for RouterError {
	fn from(error: AdapterError) -> Self {
		match error {
			AdapterError::UnknownPair {
				token_a, token_b, ..
			} => RouterError::UnknownPair { token_a, token_b },
			AdapterError::Expired { deadline, now } => RouterError::Expired { deadline, now },
			AdapterError::InsufficientOutput { required, actual } => {
				RouterError::InsufficientOutput { required, actual }
			},
			AdapterError::TransferFailed(inner) => RouterError::TransferFailed(inner),
			AdapterError::Unauthorized { caller, adapter_id } => {
				RouterError::unauthorized(caller, format!("configure adapter {}", adapter_id))
			},
			AdapterError::InvalidConfiguration { reason } => {
				RouterError::InvalidConfiguration { reason }
			},
			other => RouterError::Adapter(other),
		}
	}
}

impl From<LedgerError> for RouterError {
	fn from(error: LedgerError) -> Self {
		RouterError::TransferFailed(error)
	}
}

pub type RouterResult<T> = Result<T, RouterError>;
