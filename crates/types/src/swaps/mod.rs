//! Swap request and receipt models

use serde::{Deserialize, Serialize};

use crate::models::{amount, Address, Amount, Path, Token};

/// A caller's request to convert `amount_in` of `token_in` into the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
	pub caller: Address,
	pub token_in: Token,
	#[serde(with = "amount::as_string")]
	pub amount_in: Amount,
	#[serde(with = "amount::as_string")]
	pub amount_out_min: Amount,
	/// Unix timestamp in seconds
	pub deadline: u64,
	/// Native value attached to the call; must equal `amount_in` when
	/// `token_in` is native and be zero otherwise
	#[serde(with = "amount::as_string", default)]
	pub value: Amount,
}

impl SwapRequest {
	pub fn new(
		caller: Address,
		token_in: Token,
		amount_in: Amount,
		amount_out_min: Amount,
		deadline: u64,
	) -> Self {
		Self {
			caller,
			token_in,
			amount_in,
			amount_out_min,
			deadline,
			value: 0,
		}
	}

	/// Native-input swap with the value attached
	pub fn native(caller: Address, amount_in: Amount, amount_out_min: Amount, deadline: u64) -> Self {
		Self {
			caller,
			token_in: Token::NATIVE,
			amount_in,
			amount_out_min,
			deadline,
			value: amount_in,
		}
	}

	pub fn with_value(mut self, value: Amount) -> Self {
		self.value = value;
		self
	}
}

/// Result of a successful swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapReceipt {
	pub swap_id: String,
	pub path: Path,
	pub adapter: Option<String>,
	#[serde(with = "amount::as_string")]
	pub amount_in: Amount,
	#[serde(with = "amount::as_string")]
	pub amount_out: Amount,
	pub recipient: Address,
}
