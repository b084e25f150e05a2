//! Serializable quote view

use serde::{Deserialize, Serialize};

use super::Quote;
use crate::models::{amount, Amount, Token};

/// Quote as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
	pub path: Vec<Token>,
	pub encoded_path: String,
	#[serde(with = "amount::as_string")]
	pub amount_out: Amount,
	#[serde(with = "amount::as_string")]
	pub amount_in: Amount,
	pub adapter: Option<String>,
	pub hops: usize,
}

impl From<&Quote> for QuoteResponse {
	fn from(quote: &Quote) -> Self {
		Self {
			path: quote.path.tokens().to_vec(),
			encoded_path: quote.encoded_path.to_hex(),
			amount_out: quote.amount_out,
			amount_in: quote.amount_in,
			adapter: quote.adapter_name().map(str::to_string),
			hops: quote.hops(),
		}
	}
}
