//! Best-route quote model

pub mod response;

pub use response::QuoteResponse;

use crate::adapters::RegisteredAdapter;
use crate::models::{Amount, EncodedPath, Path, Token};

/// Best route found for an input token and amount
///
/// `adapter` is `None` only for the identity quote (input already equals the
/// target token).
#[derive(Debug, Clone)]
pub struct Quote {
	pub path: Path,
	pub encoded_path: EncodedPath,
	pub amount_out: Amount,
	pub amount_in: Amount,
	pub adapter: Option<RegisteredAdapter>,
}

impl Quote {
	/// Quote for an input that already is the target token
	pub fn identity(token: Token, amount_in: Amount) -> Self {
		Self {
			encoded_path: EncodedPath::from_bytes(token.as_bytes().to_vec()),
			path: Path::identity(token),
			amount_out: amount_in,
			amount_in,
			adapter: None,
		}
	}

	pub fn is_identity(&self) -> bool {
		self.adapter.is_none()
	}

	pub fn hops(&self) -> usize {
		self.path.hops()
	}

	pub fn adapter_name(&self) -> Option<&str> {
		self.adapter.as_ref().map(|entry| entry.name.as_str())
	}
}
