//! QuantFi Adapters
//!
//! DEX adapters, the adapter registry and the in-memory pool venue.

pub mod pool_venue;
pub mod registry;
pub mod uniswap_v3;

#[cfg(test)]
pub(crate) mod test_support;

pub use pool_venue::{Pool, PoolVenue};
pub use quantfi_types::{AdapterError, AdapterResult, DexAdapter};
pub use registry::AdapterRegistry;
pub use uniswap_v3::UniswapV3Adapter;

use quantfi_types::{AdapterConfig, AdapterKind, Clock, Token, Venue};
use std::sync::Arc;
use tracing::debug;

/// Factory for creating adapters from configuration
pub struct AdapterFactory;

impl AdapterFactory {
	/// Construct the adapter described by `config` and register its edges
	///
	/// Explicit `fee_tiers` are applied first, then `full_mesh_fee` (if set)
	/// covers every exchange-token pair and each exchange token to `target`.
	/// Edges are written with the configured owner as caller.
	pub fn create_from_config(
		config: &AdapterConfig,
		venue: Arc<dyn Venue>,
		clock: Arc<dyn Clock>,
		target: Token,
	) -> AdapterResult<Arc<dyn DexAdapter>> {
		if !config.is_enabled() {
			return Err(AdapterError::InvalidConfiguration {
				reason: format!("adapter {} is disabled", config.adapter_id),
			});
		}

		match config.kind {
			AdapterKind::UniswapV3 => {
				let adapter = UniswapV3Adapter::new(config, venue, clock)?;
				for edge in &config.fee_tiers {
					adapter.set_fee_tier(&config.owner, edge.token_a, edge.token_b, edge.fee)?;
				}
				if let Some(fee) = config.full_mesh_fee {
					adapter.configure_full_mesh(&config.owner, target, fee)?;
				}

				debug!(
					"Created {} adapter {} with {} fee tiers",
					config.kind,
					config.adapter_id,
					adapter.fee_tiers().len()
				);
				Ok(Arc::new(adapter))
			},
		}
	}
}
