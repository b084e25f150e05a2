//! Token amounts in base units

/// Token amount in base units
pub type Amount = u128;

/// Serde helpers that encode an [`Amount`] as a decimal string
///
/// Keeps precision for JSON consumers that parse numbers as doubles.
pub mod as_string {
	use super::Amount;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&value.to_string())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		if value.is_empty() {
			return Err(serde::de::Error::custom("amount cannot be empty"));
		}
		if !value.chars().all(|c| c.is_ascii_digit()) {
			return Err(serde::de::Error::custom("amount must contain only digits"));
		}
		value.parse().map_err(serde::de::Error::custom)
	}
}
