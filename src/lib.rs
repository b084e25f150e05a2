//! QuantFi Router Library
//!
//! Best-route token swaps: a bounded multi-hop path search over pluggable
//! DEX adapters, with atomic execution against an in-memory ledger.

// Core domain types
pub use quantfi_types::{
	chrono,
	serde_json,
	Address,
	AdapterConfig,
	AdapterError,
	Amount,
	Clock,
	DexAdapter,
	EncodedPath,
	FeeTier,
	Ledger,
	LedgerError,
	Path,
	Quote,
	QuoteResponse,
	RouterError,
	RouterResult,
	SearchSettings,
	SearchStrategy,
	SwapReceipt,
	SwapRequest,
	SystemClock,
	Token,
	Venue,
	VenueError,
};

// Service layer
pub use quantfi_service::{PathFinder, RoutingAuthority, SwapExecutor};

// Ledger and adapters
pub use quantfi_adapters::{AdapterFactory, AdapterRegistry, PoolVenue, UniswapV3Adapter};
pub use quantfi_ledger::{LedgerTransaction, MemoryLedger};

// Config
pub use quantfi_config::{
	load_config, log_router_ready, log_service_info, log_service_shutdown, ConfigLoadError,
	ConfigValidationError, Settings,
};

pub mod types {
	pub use quantfi_types::*;
}

pub mod config {
	pub use quantfi_config::*;
}

pub mod adapters {
	pub use quantfi_adapters::*;
}

pub mod ledger {
	pub use quantfi_ledger::*;
}

pub mod service {
	pub use quantfi_service::*;
}

pub mod mocks;

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Venue name used for the in-memory pools
const POOL_VENUE_NAME: &str = "pool-venue";

/// Failures while assembling a router from settings
#[derive(Error, Debug)]
pub enum BuildError {
	#[error("Invalid configuration: {0}")]
	Config(#[from] ConfigValidationError),

	#[error("Failed to seed pool: {0}")]
	Venue(#[from] VenueError),

	#[error("Failed to create adapter: {0}")]
	Adapter(#[from] AdapterError),

	#[error("Failed to wire router: {0}")]
	Router(#[from] RouterError),
}

/// A fully wired router: executor, ledger and venue sharing one state
#[derive(Clone)]
pub struct Router {
	executor: Arc<SwapExecutor>,
	ledger: MemoryLedger,
	venue: Arc<PoolVenue>,
	settings: Arc<Settings>,
}

impl Router {
	pub fn executor(&self) -> &Arc<SwapExecutor> {
		&self.executor
	}

	pub fn ledger(&self) -> &MemoryLedger {
		&self.ledger
	}

	pub fn venue(&self) -> &Arc<PoolVenue> {
		&self.venue
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub fn owner(&self) -> Address {
		self.executor.owner()
	}

	pub async fn quote(&self, token_in: Token, amount_in: Amount) -> RouterResult<Quote> {
		self.executor.quote(token_in, amount_in).await
	}

	pub async fn swap(&self, request: SwapRequest) -> RouterResult<SwapReceipt> {
		self.executor.swap(request).await
	}
}

/// Builder wiring a [`Router`] from [`Settings`]
///
/// Construction order is fixed: pools, path finder, executor (consuming
/// the routing authority), adapter fee tiers, then adapter registration.
pub struct RouterBuilder {
	settings: Settings,
	clock: Option<Arc<dyn Clock>>,
	adapters: Vec<(String, Arc<dyn DexAdapter>)>,
}

impl RouterBuilder {
	pub fn from_settings(settings: Settings) -> Self {
		Self {
			settings,
			clock: None,
			adapters: Vec::new(),
		}
	}

	/// Replace the system clock, e.g. with a manual clock in tests
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);
		self
	}

	/// Register an extra adapter after the configured ones
	pub fn with_adapter(mut self, name: impl Into<String>, adapter: Arc<dyn DexAdapter>) -> Self {
		self.adapters.push((name.into(), adapter));
		self
	}

	pub fn settings(&self) -> &Settings {
		&self.settings
	}

	pub async fn build(self) -> Result<Router, BuildError> {
		let settings = self.settings;
		settings.validate()?;

		let ledger = MemoryLedger::new();
		let venue = Arc::new(PoolVenue::new(
			POOL_VENUE_NAME,
			Arc::new(ledger.clone()) as Arc<dyn Ledger>,
		));
		let clock = self
			.clock
			.unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);

		for pool in &settings.pools {
			let fee = FeeTier::new(pool.fee).map_err(|_| ConfigValidationError::InvalidFeeTier {
				context: format!("Pool {}/{}", pool.token_a, pool.token_b),
				raw: pool.fee,
			})?;
			venue
				.seed_pool(pool.token_a, pool.token_b, fee, pool.reserve_a, pool.reserve_b)
				.await?;
		}

		let target = settings.routing.target_token;
		let (path_finder, authority) = PathFinder::with_settings(
			target,
			settings.routing.max_hops,
			settings.search_settings(),
		)?;
		let owner = settings.accounts.owner;
		let executor = Arc::new(SwapExecutor::new(
			Arc::new(path_finder),
			authority,
			owner,
			settings.accounts.executor,
			ledger.clone(),
			Arc::clone(&clock),
		)?);

		for config in settings.adapter_configs()? {
			let adapter = AdapterFactory::create_from_config(
				&config,
				Arc::clone(&venue) as Arc<dyn Venue>,
				Arc::clone(&clock),
				target,
			)?;
			executor.add_adapter(&owner, &config.name, adapter)?;
		}
		for (name, adapter) in self.adapters {
			executor.add_adapter(&owner, &name, adapter)?;
		}

		info!(
			"Router built with {} pool(s) and {} adapter(s)",
			settings.pools.len(),
			executor.adapter_names().len()
		);

		Ok(Router {
			executor,
			ledger,
			venue,
			settings: Arc::new(settings),
		})
	}
}

/// Initialize tracing from the logging settings
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing_from_settings(
	settings: &Settings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	use quantfi_config::LogFormat;

	let log_level = &settings.logging.level;
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	match settings.logging.format {
		LogFormat::Json => {
			let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
		LogFormat::Pretty => {
			let subscriber = tracing_subscriber::fmt()
				.pretty()
				.with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
		LogFormat::Compact => {
			let subscriber = tracing_subscriber::fmt()
				.compact()
				.with_env_filter(env_filter);

			if settings.logging.structured {
				subscriber.with_target(true).with_thread_ids(true).try_init()?;
			} else {
				subscriber.try_init()?;
			}
		},
	}

	info!(
		"Logging configuration applied: level={}, format={:?}, structured={}",
		settings.logging.level, settings.logging.format, settings.logging.structured
	);

	Ok(())
}
