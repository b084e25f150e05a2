//! Adapter configuration

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{AdapterError, AdapterResult};
use crate::models::{Address, FeeTier, Token};

/// Supported adapter implementations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AdapterKind {
	#[default]
	UniswapV3,
}

impl std::fmt::Display for AdapterKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AdapterKind::UniswapV3 => write!(f, "uniswap-v3"),
		}
	}
}

/// One explicitly configured edge
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeTierConfig {
	pub token_a: Token,
	pub token_b: Token,
	pub fee: FeeTier,
}

/// Everything needed to construct and seed one adapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterConfig {
	pub adapter_id: String,
	pub name: String,
	pub kind: AdapterKind,
	pub enabled: bool,
	pub account: Address,
	pub owner: Address,
	pub wrapped_native: Token,
	pub exchange_tokens: Vec<Token>,
	#[serde(default)]
	pub fee_tiers: Vec<FeeTierConfig>,
	/// When set, every exchange-token pair and every exchange token to the
	/// target receives this tier
	#[serde(default)]
	pub full_mesh_fee: Option<FeeTier>,
}

impl AdapterConfig {
	pub fn new(
		adapter_id: impl Into<String>,
		account: Address,
		owner: Address,
		wrapped_native: Token,
		exchange_tokens: Vec<Token>,
	) -> Self {
		let adapter_id = adapter_id.into();
		Self {
			name: adapter_id.clone(),
			adapter_id,
			kind: AdapterKind::UniswapV3,
			enabled: true,
			account,
			owner,
			wrapped_native,
			exchange_tokens,
			fee_tiers: Vec::new(),
			full_mesh_fee: None,
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_fee_tier(mut self, token_a: Token, token_b: Token, fee: FeeTier) -> Self {
		self.fee_tiers.push(FeeTierConfig {
			token_a,
			token_b,
			fee,
		});
		self
	}

	pub fn with_full_mesh_fee(mut self, fee: FeeTier) -> Self {
		self.full_mesh_fee = Some(fee);
		self
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn validate(&self) -> AdapterResult<()> {
		let invalid = |reason: String| AdapterError::InvalidConfiguration { reason };

		if self.adapter_id.trim().is_empty() {
			return Err(invalid("adapter_id cannot be empty".to_string()));
		}
		if self.account.is_zero() {
			return Err(invalid(format!(
				"adapter {} needs a non-zero account",
				self.adapter_id
			)));
		}
		if self.wrapped_native.is_zero() {
			return Err(invalid(format!(
				"adapter {} needs a wrapped native token",
				self.adapter_id
			)));
		}

		let mut seen = HashSet::new();
		for token in &self.exchange_tokens {
			if token.is_zero() {
				return Err(invalid(format!(
					"adapter {} lists the native sentinel as an exchange token",
					self.adapter_id
				)));
			}
			if !seen.insert(*token) {
				return Err(invalid(format!(
					"adapter {} lists exchange token {} twice",
					self.adapter_id, token
				)));
			}
		}

		for edge in &self.fee_tiers {
			if edge.token_a == edge.token_b {
				return Err(invalid(format!(
					"fee tier for {} pairs a token with itself",
					edge.token_a
				)));
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config() -> AdapterConfig {
		AdapterConfig::new(
			"uniswap-v3",
			Address::from_low_u64(0xa1),
			Address::from_low_u64(0x01),
			Token::from_low_u64(0xee),
			vec![Token::from_low_u64(1), Token::from_low_u64(2)],
		)
	}

	#[test]
	fn test_valid_config() {
		assert!(config().validate().is_ok());
		assert!(config().is_enabled());
		assert_eq!(config().name, "uniswap-v3");
	}

	#[test]
	fn test_rejects_duplicate_exchange_tokens() {
		let mut cfg = config();
		cfg.exchange_tokens.push(Token::from_low_u64(1));
		assert!(matches!(
			cfg.validate(),
			Err(AdapterError::InvalidConfiguration { .. })
		));
	}

	#[test]
	fn test_rejects_self_edge() {
		let cfg = config().with_fee_tier(
			Token::from_low_u64(1),
			Token::from_low_u64(1),
			FeeTier::MEDIUM,
		);
		assert!(cfg.validate().is_err());
	}

	#[test]
	fn test_kind_serde() {
		let json = serde_json::to_string(&AdapterKind::UniswapV3).unwrap();
		assert_eq!(json, "\"uniswap-v3\"");
	}
}
