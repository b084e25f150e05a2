//! Routing configuration shared by the path finder and its callers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Token;

pub const DEFAULT_MAX_HOPS: usize = 4;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 4_000;
pub const DEFAULT_MAX_CONCURRENT_QUOTES: usize = 8;
pub const DEFAULT_MAX_QUOTES_PER_ADAPTER: usize = 512;

/// Target token and hop bound, swapped as one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingConfig {
	pub target_token: Token,
	pub max_hops: usize,
}

impl RoutingConfig {
	pub fn new(target_token: Token, max_hops: usize) -> Self {
		Self {
			target_token,
			max_hops,
		}
	}
}

/// How candidate paths are explored within one adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategy {
	/// Quote every simple path within the hop bound
	#[default]
	#[serde(rename = "exhaustive")]
	Exhaustive,
	/// Bellman-Ford style relaxation over single-hop quotes, one round per hop
	#[serde(rename = "relaxation")]
	HopBoundedRelaxation,
}

impl fmt::Display for SearchStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SearchStrategy::Exhaustive => write!(f, "exhaustive"),
			SearchStrategy::HopBoundedRelaxation => write!(f, "relaxation"),
		}
	}
}

/// Resource limits applied to every search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
	pub strategy: SearchStrategy,
	pub search_timeout_ms: u64,
	pub max_concurrent_quotes: usize,
	pub max_quotes_per_adapter: usize,
}

impl Default for SearchSettings {
	fn default() -> Self {
		Self {
			strategy: SearchStrategy::default(),
			search_timeout_ms: DEFAULT_SEARCH_TIMEOUT_MS,
			max_concurrent_quotes: DEFAULT_MAX_CONCURRENT_QUOTES,
			max_quotes_per_adapter: DEFAULT_MAX_QUOTES_PER_ADAPTER,
		}
	}
}

impl SearchSettings {
	pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
		self.strategy = strategy;
		self
	}

	pub fn with_timeout_ms(mut self, search_timeout_ms: u64) -> Self {
		self.search_timeout_ms = search_timeout_ms;
		self
	}

	pub fn with_max_concurrent_quotes(mut self, max_concurrent_quotes: usize) -> Self {
		self.max_concurrent_quotes = max_concurrent_quotes;
		self
	}

	pub fn with_max_quotes_per_adapter(mut self, max_quotes_per_adapter: usize) -> Self {
		self.max_quotes_per_adapter = max_quotes_per_adapter;
		self
	}
}
