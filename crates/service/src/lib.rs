//! QuantFi Service
//!
//! Best-route search and atomic swap execution.

pub mod authority;
pub mod path_finder;
pub mod swap_executor;

#[cfg(test)]
pub(crate) mod test_support;

pub use authority::RoutingAuthority;
pub use path_finder::PathFinder;
pub use quantfi_types::{RouterError, RouterResult, SearchSettings, SearchStrategy};
pub use swap_executor::SwapExecutor;
