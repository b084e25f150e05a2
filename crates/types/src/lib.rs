//! QuantFi Types
//!
//! Shared models, capability traits and errors for the QuantFi router.

pub mod adapters;
pub mod clock;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod quotes;
pub mod routing;
pub mod swaps;
pub mod venue;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use adapters::{
	AdapterConfig, AdapterError, AdapterInfo, AdapterKind, AdapterResult, DexAdapter,
	ExecuteRequest, FeeTierConfig, RegisteredAdapter,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{RouterError, RouterResult};
pub use ledger::{Ledger, LedgerError, LedgerResult};
pub use models::{
	Address, Amount, EncodedPath, FeeTier, FeeTierError, IdentifierError, PairKey, Path,
	PathError, Token, FEE_DENOMINATOR,
};
pub use quotes::{Quote, QuoteResponse};
pub use routing::{RoutingConfig, SearchSettings, SearchStrategy, DEFAULT_MAX_HOPS};
pub use swaps::{SwapReceipt, SwapRequest};
pub use venue::{Venue, VenueError, VenueResult};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::MockClock;
