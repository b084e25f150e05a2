//! Adapter domain models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::DexAdapter;
use crate::models::{Address, Amount, Path, Token};

/// Descriptive adapter metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdapterInfo {
	pub adapter_id: String,
	pub name: String,
	pub version: String,
	pub description: Option<String>,
}

impl AdapterInfo {
	pub fn new(adapter_id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			adapter_id: adapter_id.into(),
			name: name.into(),
			version: "1.0.0".to_string(),
			description: None,
		}
	}

	pub fn with_version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}
}

/// Adapter as stored in the registry: its registered name, the order it
/// was registered in, and the capability handle itself
#[derive(Clone)]
pub struct RegisteredAdapter {
	pub name: String,
	pub sequence: u64,
	pub adapter: Arc<dyn DexAdapter>,
}

impl RegisteredAdapter {
	pub fn new(name: impl Into<String>, sequence: u64, adapter: Arc<dyn DexAdapter>) -> Self {
		Self {
			name: name.into(),
			sequence,
			adapter,
		}
	}

	/// True when both entries point at the same adapter instance
	pub fn same_handle(&self, other: &RegisteredAdapter) -> bool {
		Arc::ptr_eq(&self.adapter, &other.adapter)
	}
}

impl fmt::Debug for RegisteredAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegisteredAdapter")
			.field("name", &self.name)
			.field("sequence", &self.sequence)
			.field("adapter_id", &self.adapter.id())
			.finish()
	}
}

/// Parameters of one adapter trade
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteRequest {
	/// Account the input is pulled from (must have approved the adapter)
	pub caller: Address,
	pub path: Path,
	/// Input token as the caller holds it; may be [`Token::NATIVE`]
	pub token_in: Token,
	pub amount_in: Amount,
	pub amount_out_min: Amount,
	pub recipient: Address,
	/// Unix timestamp in seconds
	pub deadline: u64,
}
