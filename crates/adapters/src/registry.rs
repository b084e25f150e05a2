//! Named adapter registry
//!
//! The registry is the single store of adapter handles. Readers take an
//! immutable, registration-ordered snapshot; writers swap the snapshot under
//! a short write lock, so a search in flight never observes a half-applied
//! update.

use quantfi_types::{AdapterError, AdapterResult, DexAdapter, RegisteredAdapter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

#[derive(Debug)]
pub struct AdapterRegistry {
	entries: RwLock<Arc<[RegisteredAdapter]>>,
	next_sequence: AtomicU64,
}

impl Default for AdapterRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self {
			entries: RwLock::new(Arc::from(Vec::new())),
			next_sequence: AtomicU64::new(0),
		}
	}

	/// Register `adapter` under `name`
	///
	/// Re-adding an existing name swaps the handle but keeps the original
	/// position and sequence number.
	pub fn add(&self, name: &str, adapter: Arc<dyn DexAdapter>) -> AdapterResult<()> {
		if name.trim().is_empty() {
			return Err(AdapterError::InvalidConfiguration {
				reason: "adapter name cannot be empty".to_string(),
			});
		}

		let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
		let mut entries: Vec<RegisteredAdapter> = guard.iter().cloned().collect();

		match entries.iter_mut().find(|entry| entry.name == name) {
			Some(existing) => {
				existing.adapter = adapter;
				info!(
					"Replaced adapter '{}' (sequence {})",
					name, existing.sequence
				);
			},
			None => {
				let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
				info!(
					"Registered adapter '{}' ({}) with sequence {}",
					name,
					adapter.id(),
					sequence
				);
				entries.push(RegisteredAdapter::new(name, sequence, adapter));
			},
		}

		*guard = Arc::from(entries);
		Ok(())
	}

	/// Drop the handle registered under `name`; false if there was none
	pub fn remove(&self, name: &str) -> bool {
		let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
		if !guard.iter().any(|entry| entry.name == name) {
			return false;
		}

		let remaining: Vec<RegisteredAdapter> = guard
			.iter()
			.filter(|entry| entry.name != name)
			.cloned()
			.collect();
		*guard = Arc::from(remaining);

		info!("Removed adapter '{}'", name);
		true
	}

	pub fn get(&self, name: &str) -> Option<RegisteredAdapter> {
		self.snapshot()
			.iter()
			.find(|entry| entry.name == name)
			.cloned()
	}

	/// Registration-ordered view of every adapter
	pub fn snapshot(&self) -> Arc<[RegisteredAdapter]> {
		Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
	}

	pub fn names(&self) -> Vec<String> {
		self.snapshot()
			.iter()
			.map(|entry| entry.name.clone())
			.collect()
	}

	pub fn len(&self) -> usize {
		self.snapshot().len()
	}

	pub fn is_empty(&self) -> bool {
		self.snapshot().is_empty()
	}
}
