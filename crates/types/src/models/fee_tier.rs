//! Fee tiers and unordered token pairs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::Token;

/// Fee denominator: tiers are expressed in hundredths of a basis point
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Largest value that fits the 3-byte path encoding
const MAX_ENCODED_FEE: u32 = (1 << 24) - 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeTierError {
	#[error("Fee tier {raw} out of range (must be below {FEE_DENOMINATOR})")]
	OutOfRange { raw: u32 },
}

/// Pool fee identifier in hundredths of a basis point (3000 = 0.3%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FeeTier(u32);

impl FeeTier {
	/// 0.01%
	pub const LOWEST: FeeTier = FeeTier(100);
	/// 0.05%
	pub const LOW: FeeTier = FeeTier(500);
	/// 0.3%
	pub const MEDIUM: FeeTier = FeeTier(3000);
	/// 1%
	pub const HIGH: FeeTier = FeeTier(10_000);

	pub fn new(raw: u32) -> Result<Self, FeeTierError> {
		if raw >= FEE_DENOMINATOR || raw > MAX_ENCODED_FEE {
			return Err(FeeTierError::OutOfRange { raw });
		}
		Ok(Self(raw))
	}

	pub fn raw(&self) -> u32 {
		self.0
	}

	/// Fee in basis points
	pub fn bps(&self) -> f64 {
		self.0 as f64 / 100.0
	}

	pub fn to_be_bytes(&self) -> [u8; 3] {
		[(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
	}

	pub fn from_be_bytes(bytes: [u8; 3]) -> Result<Self, FeeTierError> {
		Self::new(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32)
	}

	pub fn all() -> &'static [FeeTier] {
		&[
			FeeTier::LOWEST,
			FeeTier::LOW,
			FeeTier::MEDIUM,
			FeeTier::HIGH,
		]
	}
}

impl Default for FeeTier {
	fn default() -> Self {
		Self::MEDIUM
	}
}

impl TryFrom<u32> for FeeTier {
	type Error = FeeTierError;

	fn try_from(raw: u32) -> Result<Self, Self::Error> {
		Self::new(raw)
	}
}

impl From<FeeTier> for u32 {
	fn from(tier: FeeTier) -> Self {
		tier.0
	}
}

impl fmt::Display for FeeTier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}%", self.0 as f64 / 10_000.0)
	}
}

/// Order-independent token pair: `PairKey::new(a, b) == PairKey::new(b, a)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
	low: Token,
	high: Token,
}

impl PairKey {
	pub fn new(token_a: Token, token_b: Token) -> Self {
		if token_a <= token_b {
			Self {
				low: token_a,
				high: token_b,
			}
		} else {
			Self {
				low: token_b,
				high: token_a,
			}
		}
	}

	/// Tokens in canonical (sorted) order
	pub fn tokens(&self) -> (Token, Token) {
		(self.low, self.high)
	}

	pub fn contains(&self, token: &Token) -> bool {
		self.low == *token || self.high == *token
	}
}

impl fmt::Display for PairKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.low, self.high)
	}
}
