//! Capability that gates routing configuration changes

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PATH_FINDER_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_path_finder_id() -> u64 {
	NEXT_PATH_FINDER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Proof of the right to reconfigure one [`PathFinder`](crate::PathFinder)
///
/// Minted once by `PathFinder::new` and moved into the swap executor. Not
/// `Clone`: whoever holds it is the only party able to change the target
/// token, the hop bound or the adapter registry.
#[derive(Debug)]
pub struct RoutingAuthority {
	path_finder_id: u64,
}

impl RoutingAuthority {
	pub(crate) fn new(path_finder_id: u64) -> Self {
		Self { path_finder_id }
	}

	pub fn path_finder_id(&self) -> u64 {
		self.path_finder_id
	}
}
