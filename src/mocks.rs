//! Demo market for examples and testing
//!
//! Four exchange tokens routed into USDT through one UniswapV3 adapter.
//! Every token trades directly against USDT and against each other, with
//! prices that agree across pools (1 WBTC = 40,000, 1 WETH = 2,000,
//! 1 BNB = 400, 1 UNI = 5).

use std::collections::BTreeMap;

use quantfi_config::{
	AccountSettings, AdapterSettings, LoggingSettings, PoolSettings, RoutingSettings, Settings,
};
use quantfi_types::{Address, AdapterKind, Amount, FeeTier, Token};

/// One whole token at 18 decimals
pub const UNIT: Amount = 1_000_000_000_000_000_000;

pub const USDT: Token = token(0x05d7);
pub const WETH: Token = token(0xe7);
pub const WBTC: Token = token(0xb7c);
pub const BNB: Token = token(0xb2b);
pub const UNI: Token = token(0x0a1);

pub const OWNER: Address = address(0x0a);
pub const EXECUTOR: Address = address(0xe4ec);
pub const UNISWAP_ACCOUNT: Address = address(0xad);

pub const UNISWAP_V3: &str = "uniswapV3";

const fn low_bytes(value: u16) -> [u8; 20] {
	let mut bytes = [0u8; 20];
	bytes[18] = (value >> 8) as u8;
	bytes[19] = value as u8;
	bytes
}

const fn token(value: u16) -> Token {
	Token::from_bytes(low_bytes(value))
}

const fn address(value: u16) -> Address {
	Address::from_bytes(low_bytes(value))
}

/// USD price per whole token
fn usd_price(token: &Token) -> Amount {
	match *token {
		t if t == WBTC => 40_000,
		t if t == WETH => 2_000,
		t if t == BNB => 400,
		t if t == UNI => 5,
		_ => 1,
	}
}

/// Pool holding `depth_usd` of value on each side
fn pool(token_a: Token, token_b: Token, depth_usd: Amount) -> PoolSettings {
	PoolSettings {
		token_a,
		token_b,
		fee: FeeTier::MEDIUM.raw(),
		reserve_a: depth_usd * UNIT / usd_price(&token_a),
		reserve_b: depth_usd * UNIT / usd_price(&token_b),
	}
}

pub fn exchange_tokens() -> Vec<Token> {
	vec![WETH, WBTC, BNB, UNI]
}

/// Pools for every exchange-token pair and each exchange token to USDT
pub fn demo_pools() -> Vec<PoolSettings> {
	let tokens = exchange_tokens();
	let mut pools: Vec<_> = tokens
		.iter()
		.map(|token| pool(*token, USDT, 2_000_000))
		.collect();
	for (i, token_a) in tokens.iter().enumerate() {
		for token_b in &tokens[i + 1..] {
			pools.push(pool(*token_a, *token_b, 500_000));
		}
	}
	pools
}

pub fn demo_adapter() -> AdapterSettings {
	AdapterSettings {
		name: Some(UNISWAP_V3.to_string()),
		kind: AdapterKind::UniswapV3,
		enabled: true,
		account: UNISWAP_ACCOUNT,
		owner: None,
		wrapped_native: WETH,
		exchange_tokens: exchange_tokens().iter().map(Token::to_string).collect(),
		fee_tiers: Vec::new(),
		full_mesh_fee: Some(FeeTier::MEDIUM.raw()),
	}
}

/// Complete settings for the demo market
pub fn demo_settings() -> Settings {
	let mut adapters = BTreeMap::new();
	adapters.insert("uniswap-v3".to_string(), demo_adapter());

	Settings {
		routing: RoutingSettings {
			target_token: USDT,
			..RoutingSettings::default()
		},
		accounts: AccountSettings {
			owner: OWNER,
			executor: EXECUTOR,
		},
		pools: demo_pools(),
		adapters,
		probe_tokens: exchange_tokens(),
		logging: LoggingSettings::default(),
	}
}
