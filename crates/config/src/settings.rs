//! Configuration settings structures

use quantfi_types::models::amount;
use quantfi_types::{
	Address, AdapterConfig, AdapterKind, Amount, FeeTier, SearchSettings, SearchStrategy, Token,
	DEFAULT_MAX_HOPS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
	pub routing: RoutingSettings,
	pub accounts: AccountSettings,
	pub pools: Vec<PoolSettings>,
	/// Adapters keyed by id; registered in key order
	pub adapters: BTreeMap<String, AdapterSettings>,
	/// Tokens the binary quotes at startup
	pub probe_tokens: Vec<Token>,
	pub logging: LoggingSettings,
}

/// Path search configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RoutingSettings {
	pub target_token: Token,
	pub max_hops: usize,
	pub strategy: SearchStrategy,
	pub search_timeout_ms: u64,
	pub max_concurrent_quotes: usize,
	pub max_quotes_per_adapter: usize,
}

impl Default for RoutingSettings {
	fn default() -> Self {
		let search = SearchSettings::default();
		Self {
			target_token: Token::NATIVE,
			max_hops: DEFAULT_MAX_HOPS,
			strategy: search.strategy,
			search_timeout_ms: search.search_timeout_ms,
			max_concurrent_quotes: search.max_concurrent_quotes,
			max_quotes_per_adapter: search.max_quotes_per_adapter,
		}
	}
}

impl RoutingSettings {
	pub fn search_settings(&self) -> SearchSettings {
		SearchSettings {
			strategy: self.strategy,
			search_timeout_ms: self.search_timeout_ms,
			max_concurrent_quotes: self.max_concurrent_quotes,
			max_quotes_per_adapter: self.max_quotes_per_adapter,
		}
	}
}

/// Accounts the router itself operates
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AccountSettings {
	/// Owner of the executor and default owner of every adapter
	pub owner: Address,
	/// Ledger account the executor holds in-flight funds in
	pub executor: Address,
}

/// Pool seeded into the venue at startup
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolSettings {
	pub token_a: Token,
	pub token_b: Token,
	pub fee: u32,
	#[serde(with = "amount::as_string")]
	pub reserve_a: Amount,
	#[serde(with = "amount::as_string")]
	pub reserve_b: Amount,
}

/// One explicitly configured adapter edge
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeeTierSettings {
	pub token_a: String,
	pub token_b: String,
	pub fee: u32,
}

/// Individual adapter configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdapterSettings {
	/// Registry name; defaults to the adapter id
	pub name: Option<String>,
	#[serde(default)]
	pub kind: AdapterKind,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	pub account: Address,
	/// Defaults to `accounts.owner`
	pub owner: Option<Address>,
	pub wrapped_native: Token,
	#[serde(default)]
	pub exchange_tokens: Vec<String>,
	#[serde(default)]
	pub fee_tiers: Vec<FeeTierSettings>,
	pub full_mesh_fee: Option<u32>,
}

fn default_enabled() -> bool {
	true
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Reasons a loaded configuration is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
	#[error("routing.max_hops must be at least 1")]
	InvalidMaxHops,

	#[error("routing.target_token must be set to a non-zero token")]
	MissingTargetToken,

	#[error("routing.{field} must be positive")]
	InvalidSearchLimit { field: &'static str },

	#[error("accounts.{field} must be a non-zero address")]
	MissingAccount { field: &'static str },

	#[error("At least one adapter must be enabled")]
	NoEnabledAdapters,

	#[error("Adapter {adapter_id}: cannot parse token '{value}': {reason}")]
	InvalidToken {
		adapter_id: String,
		value: String,
		reason: String,
	},

	#[error("{context}: invalid fee tier {raw}")]
	InvalidFeeTier { context: String, raw: u32 },

	#[error("Adapter {adapter_id}: {reason}")]
	InvalidAdapter { adapter_id: String, reason: String },
}

impl Settings {
	/// Enabled adapters in registration order
	pub fn enabled_adapters(&self) -> impl Iterator<Item = (&String, &AdapterSettings)> {
		self.adapters.iter().filter(|(_, adapter)| adapter.enabled)
	}

	pub fn search_settings(&self) -> SearchSettings {
		self.routing.search_settings()
	}

	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		if self.routing.max_hops == 0 {
			return Err(ConfigValidationError::InvalidMaxHops);
		}
		if self.routing.target_token.is_zero() {
			return Err(ConfigValidationError::MissingTargetToken);
		}
		for (field, value) in [
			("search_timeout_ms", self.routing.search_timeout_ms as usize),
			("max_concurrent_quotes", self.routing.max_concurrent_quotes),
			("max_quotes_per_adapter", self.routing.max_quotes_per_adapter),
		] {
			if value == 0 {
				return Err(ConfigValidationError::InvalidSearchLimit { field });
			}
		}
		if self.accounts.owner.is_zero() {
			return Err(ConfigValidationError::MissingAccount { field: "owner" });
		}
		if self.accounts.executor.is_zero() {
			return Err(ConfigValidationError::MissingAccount { field: "executor" });
		}

		for pool in &self.pools {
			parse_fee(
				pool.fee,
				format!("Pool {}/{}", pool.token_a, pool.token_b),
			)?;
		}

		if self.enabled_adapters().next().is_none() {
			return Err(ConfigValidationError::NoEnabledAdapters);
		}
		for (adapter_id, adapter) in &self.adapters {
			adapter.to_adapter_config(adapter_id, self.accounts.owner)?;
		}
		Ok(())
	}

	/// Domain configs for every enabled adapter, in registration order
	pub fn adapter_configs(&self) -> Result<Vec<AdapterConfig>, ConfigValidationError> {
		self.enabled_adapters()
			.map(|(adapter_id, adapter)| adapter.to_adapter_config(adapter_id, self.accounts.owner))
			.collect()
	}
}

fn parse_fee(raw: u32, context: String) -> Result<FeeTier, ConfigValidationError> {
	FeeTier::new(raw).map_err(|_| ConfigValidationError::InvalidFeeTier { context, raw })
}

impl AdapterSettings {
	fn parse_token(&self, adapter_id: &str, value: &str) -> Result<Token, ConfigValidationError> {
		value
			.parse::<Token>()
			.map_err(|e| ConfigValidationError::InvalidToken {
				adapter_id: adapter_id.to_string(),
				value: value.to_string(),
				reason: e.to_string(),
			})
	}

	pub fn to_adapter_config(
		&self,
		adapter_id: &str,
		default_owner: Address,
	) -> Result<AdapterConfig, ConfigValidationError> {
		let exchange_tokens = self
			.exchange_tokens
			.iter()
			.map(|value| self.parse_token(adapter_id, value))
			.collect::<Result<Vec<_>, _>>()?;

		let mut config = AdapterConfig::new(
			adapter_id,
			self.account,
			self.owner.unwrap_or(default_owner),
			self.wrapped_native,
			exchange_tokens,
		)
		.with_enabled(self.enabled);
		config.kind = self.kind;
		if let Some(name) = &self.name {
			config = config.with_name(name.clone());
		}

		for edge in &self.fee_tiers {
			let token_a = self.parse_token(adapter_id, &edge.token_a)?;
			let token_b = self.parse_token(adapter_id, &edge.token_b)?;
			let fee = parse_fee(
				edge.fee,
				format!("Adapter {} edge {}/{}", adapter_id, token_a, token_b),
			)?;
			config = config.with_fee_tier(token_a, token_b, fee);
		}
		if let Some(raw) = self.full_mesh_fee {
			let fee = parse_fee(raw, format!("Adapter {} full_mesh_fee", adapter_id))?;
			config = config.with_full_mesh_fee(fee);
		}

		config
			.validate()
			.map_err(|e| ConfigValidationError::InvalidAdapter {
				adapter_id: adapter_id.to_string(),
				reason: e.to_string(),
			})?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token(n: u64) -> Token {
		Token::from_low_u64(n)
	}

	fn adapter() -> AdapterSettings {
		AdapterSettings {
			name: Some("uniswapV3".to_string()),
			kind: AdapterKind::UniswapV3,
			enabled: true,
			account: Address::from_low_u64(0xad),
			owner: None,
			wrapped_native: token(0xe7),
			exchange_tokens: vec![token(0xe7).to_string(), token(0xb7c).to_string()],
			fee_tiers: Vec::new(),
			full_mesh_fee: Some(3000),
		}
	}

	fn valid() -> Settings {
		let mut settings = Settings::default();
		settings.routing.target_token = token(0x05d7);
		settings.accounts.owner = Address::from_low_u64(0x0a);
		settings.accounts.executor = Address::from_low_u64(0xe4ec);
		settings.adapters.insert("uniswap-v3".to_string(), adapter());
		settings
	}

	#[test]
	fn test_defaults() {
		let settings = Settings::default();
		assert_eq!(settings.routing.max_hops, 4);
		assert_eq!(settings.routing.strategy, SearchStrategy::Exhaustive);
		assert_eq!(settings.routing.search_timeout_ms, 4_000);
		assert_eq!(settings.logging.format, LogFormat::Pretty);
		assert_eq!(settings.validate(), Err(ConfigValidationError::MissingTargetToken));
	}

	#[test]
	fn test_valid_settings() {
		let settings = valid();
		settings.validate().unwrap();

		let configs = settings.adapter_configs().unwrap();
		assert_eq!(configs.len(), 1);
		assert_eq!(configs[0].name, "uniswapV3");
		assert_eq!(configs[0].owner, Address::from_low_u64(0x0a));
		assert_eq!(configs[0].full_mesh_fee, Some(FeeTier::MEDIUM));
	}

	#[test]
	fn test_rejects_zero_max_hops() {
		let mut settings = valid();
		settings.routing.max_hops = 0;
		assert_eq!(settings.validate(), Err(ConfigValidationError::InvalidMaxHops));
	}

	#[test]
	fn test_requires_enabled_adapter() {
		let mut settings = valid();
		settings
			.adapters
			.values_mut()
			.for_each(|adapter| adapter.enabled = false);
		assert_eq!(
			settings.validate(),
			Err(ConfigValidationError::NoEnabledAdapters)
		);
	}

	#[test]
	fn test_rejects_unparseable_exchange_token() {
		let mut settings = valid();
		if let Some(adapter) = settings.adapters.get_mut("uniswap-v3") {
			adapter.exchange_tokens.push("0xnot-a-token".to_string());
		}
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidToken { .. })
		));
	}

	#[test]
	fn test_rejects_invalid_fee_tier() {
		let mut settings = valid();
		if let Some(adapter) = settings.adapters.get_mut("uniswap-v3") {
			adapter.full_mesh_fee = Some(1_000_000);
		}
		assert!(matches!(
			settings.validate(),
			Err(ConfigValidationError::InvalidFeeTier { raw: 1_000_000, .. })
		));
	}

	#[test]
	fn test_deserializes_from_json() {
		let json = format!(
			r#"{{
				"routing": {{ "target_token": "{}", "strategy": "relaxation" }},
				"accounts": {{ "owner": "{}", "executor": "{}" }},
				"pools": [{{ "token_a": "{}", "token_b": "{}", "fee": 3000, "reserve_a": "1000", "reserve_b": "2000" }}],
				"adapters": {{
					"uniswap-v3": {{
						"account": "{}",
						"wrapped_native": "{}",
						"exchange_tokens": ["{}"],
						"fee_tiers": [{{ "token_a": "{}", "token_b": "{}", "fee": 500 }}]
					}}
				}}
			}}"#,
			token(0x05d7),
			Address::from_low_u64(0x0a),
			Address::from_low_u64(0xe4ec),
			token(0xe7),
			token(0x05d7),
			Address::from_low_u64(0xad),
			token(0xe7),
			token(0xe7),
			token(0xe7),
			token(0x05d7),
		);

		let settings: Settings = serde_json::from_str(&json).unwrap();
		settings.validate().unwrap();
		assert_eq!(settings.routing.max_hops, 4);
		assert_eq!(
			settings.search_settings().strategy,
			SearchStrategy::HopBoundedRelaxation
		);
		assert_eq!(settings.pools[0].reserve_b, 2_000);
		let config = &settings.adapter_configs().unwrap()[0];
		assert_eq!(config.name, "uniswap-v3");
		assert_eq!(config.fee_tiers.len(), 1);
	}
}
