//! Token and account identifiers
//!
//! Both are 20-byte values rendered as `0x`-prefixed lowercase hex. The zero
//! token is reserved for the chain-native asset.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Byte length of tokens and addresses
pub const ADDRESS_LEN: usize = 20;

/// Errors raised while parsing a token or address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
	#[error("Invalid hex identifier '{value}': {reason}")]
	InvalidHex { value: String, reason: String },

	#[error("Identifier '{value}' must be {expected} bytes, got {actual}")]
	InvalidLength {
		value: String,
		expected: usize,
		actual: usize,
	},
}

fn parse_bytes(value: &str) -> Result<[u8; ADDRESS_LEN], IdentifierError> {
	let trimmed = value.trim();
	let digits = trimmed
		.strip_prefix("0x")
		.or_else(|| trimmed.strip_prefix("0X"))
		.unwrap_or(trimmed);

	let decoded = hex::decode(digits).map_err(|e| IdentifierError::InvalidHex {
		value: value.to_string(),
		reason: e.to_string(),
	})?;

	let actual = decoded.len();
	decoded
		.try_into()
		.map_err(|_| IdentifierError::InvalidLength {
			value: value.to_string(),
			expected: ADDRESS_LEN,
			actual,
		})
}

fn low_u64_bytes(value: u64) -> [u8; ADDRESS_LEN] {
	let mut bytes = [0u8; ADDRESS_LEN];
	bytes[ADDRESS_LEN - 8..].copy_from_slice(&value.to_be_bytes());
	bytes
}

/// Account identifier (users, executor, adapters, pools)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
	pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

	pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
		Self(bytes)
	}

	/// Build an address whose last eight bytes hold `value` (big-endian)
	pub fn from_low_u64(value: u64) -> Self {
		Self(low_u64_bytes(value))
	}

	pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
		&self.0
	}

	pub fn is_zero(&self) -> bool {
		self.0 == [0u8; ADDRESS_LEN]
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl fmt::Debug for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Address({})", self)
	}
}

impl FromStr for Address {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_bytes(s).map(Self)
	}
}

impl Serialize for Address {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Address {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		value.parse().map_err(serde::de::Error::custom)
	}
}

/// Tradable asset identifier
///
/// [`Token::NATIVE`] (the zero value) stands for the chain-native asset. It is
/// never routed directly: adapters substitute their wrapped-native token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Token([u8; ADDRESS_LEN]);

impl Token {
	/// Sentinel for the chain-native asset
	pub const NATIVE: Token = Token([0u8; ADDRESS_LEN]);

	pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
		Self(bytes)
	}

	/// Build a token whose last eight bytes hold `value` (big-endian)
	pub fn from_low_u64(value: u64) -> Self {
		Self(low_u64_bytes(value))
	}

	pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
		&self.0
	}

	pub fn is_native(&self) -> bool {
		*self == Self::NATIVE
	}

	/// The zero token doubles as the "empty" token for configuration checks
	pub fn is_zero(&self) -> bool {
		self.is_native()
	}

	/// Account that holds this token's contract balances
	pub fn as_address(&self) -> Address {
		Address::from_bytes(self.0)
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl fmt::Debug for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_native() {
			write!(f, "Token(native)")
		} else {
			write!(f, "Token({})", self)
		}
	}
}

impl FromStr for Token {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_bytes(s).map(Self)
	}
}

impl From<Address> for Token {
	fn from(address: Address) -> Self {
		Self(*address.as_bytes())
	}
}

impl Serialize for Token {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

impl<'de> Deserialize<'de> for Token {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		value.parse().map_err(serde::de::Error::custom)
	}
}
