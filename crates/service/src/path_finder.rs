//! Best-route search across registered adapters
//!
//! Every registered adapter is searched in its own task. Within an adapter,
//! candidate paths are quoted with bounded concurrency and a per-adapter
//! call budget; the whole search runs under one deadline. Quote failures
//! only disqualify the candidate that produced them.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use quantfi_adapters::AdapterRegistry;
use quantfi_types::{
	Address, AdapterResult, Amount, DexAdapter, Path, Quote, RegisteredAdapter, RouterError,
	RouterResult, RoutingConfig, SearchSettings, SearchStrategy, Token,
};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{debug, info, warn};

use crate::authority::{next_path_finder_id, RoutingAuthority};

/// A quoted (path, adapter) pair competing for best route
#[derive(Debug, Clone)]
struct Candidate {
	entry: RegisteredAdapter,
	path: Path,
	amount_out: Amount,
	/// Position in the adapter's enumeration order
	order: usize,
}

impl Candidate {
	/// Larger output wins; ties go to fewer hops, then the earlier adapter,
	/// then the earlier enumerated path
	fn rank(&self) -> (Amount, Reverse<usize>, Reverse<u64>, Reverse<usize>) {
		(
			self.amount_out,
			Reverse(self.path.hops()),
			Reverse(self.entry.sequence),
			Reverse(self.order),
		)
	}

	fn beats(&self, other: &Candidate) -> bool {
		self.rank() > other.rank()
	}
}

fn keep_best(best: &mut Option<Candidate>, candidate: Candidate) {
	if best.as_ref().map_or(true, |current| candidate.beats(current)) {
		*best = Some(candidate);
	}
}

#[derive(Debug)]
pub struct PathFinder {
	id: u64,
	config: RwLock<Arc<RoutingConfig>>,
	registry: Arc<AdapterRegistry>,
	settings: SearchSettings,
}

impl PathFinder {
	/// Create a path finder with default search settings
	///
	/// Returns the only [`RoutingAuthority`] able to reconfigure it.
	pub fn new(target_token: Token, max_hops: usize) -> RouterResult<(Self, RoutingAuthority)> {
		Self::with_settings(target_token, max_hops, SearchSettings::default())
	}

	pub fn with_settings(
		target_token: Token,
		max_hops: usize,
		settings: SearchSettings,
	) -> RouterResult<(Self, RoutingAuthority)> {
		validate_max_hops(max_hops)?;
		validate_target(&target_token)?;
		if settings.max_concurrent_quotes == 0 {
			return Err(RouterError::invalid_configuration(
				"max_concurrent_quotes must be at least 1",
			));
		}
		if settings.max_quotes_per_adapter == 0 {
			return Err(RouterError::invalid_configuration(
				"max_quotes_per_adapter must be at least 1",
			));
		}
		if settings.search_timeout_ms == 0 {
			return Err(RouterError::invalid_configuration(
				"search_timeout_ms must be positive",
			));
		}

		let id = next_path_finder_id();
		info!(
			"Path finder {} created: target {}, max hops {}, {} search",
			id, target_token, max_hops, settings.strategy
		);

		let path_finder = Self {
			id,
			config: RwLock::new(Arc::new(RoutingConfig::new(target_token, max_hops))),
			registry: Arc::new(AdapterRegistry::new()),
			settings,
		};
		Ok((path_finder, RoutingAuthority::new(id)))
	}

	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn settings(&self) -> SearchSettings {
		self.settings
	}

	/// Current target token and hop bound as one snapshot
	pub fn routing_config(&self) -> Arc<RoutingConfig> {
		Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
	}

	pub fn max_hops(&self) -> usize {
		self.routing_config().max_hops
	}

	pub fn target_token(&self) -> Token {
		self.routing_config().target_token
	}

	/// True if `authority` was issued by this path finder
	pub fn is_authorized(&self, authority: &RoutingAuthority) -> bool {
		authority.path_finder_id() == self.id
	}

	fn authorize(&self, authority: &RoutingAuthority, operation: &str) -> RouterResult<()> {
		if self.is_authorized(authority) {
			return Ok(());
		}
		warn!(
			"Rejected {} on path finder {}: authority belongs to path finder {}",
			operation,
			self.id,
			authority.path_finder_id()
		);
		Err(RouterError::unauthorized(
			Address::ZERO,
			format!(
				"{} with an authority issued by path finder {}",
				operation,
				authority.path_finder_id()
			),
		))
	}

	fn update_config(&self, apply: impl FnOnce(&mut RoutingConfig)) {
		let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
		let mut next = **guard;
		apply(&mut next);
		*guard = Arc::new(next);
	}

	pub fn set_max_hops(&self, authority: &RoutingAuthority, max_hops: usize) -> RouterResult<()> {
		self.authorize(authority, "set max hops")?;
		validate_max_hops(max_hops)?;
		self.update_config(|config| config.max_hops = max_hops);
		info!("Max hops set to {}", max_hops);
		Ok(())
	}

	pub fn set_target_token(&self, authority: &RoutingAuthority, target: Token) -> RouterResult<()> {
		self.authorize(authority, "set target token")?;
		validate_target(&target)?;
		self.update_config(|config| config.target_token = target);
		info!("Target token set to {}", target);
		Ok(())
	}

	pub fn add_adapter(
		&self,
		authority: &RoutingAuthority,
		name: &str,
		adapter: Arc<dyn DexAdapter>,
	) -> RouterResult<()> {
		self.authorize(authority, "add adapter")?;
		self.registry.add(name, adapter)?;
		Ok(())
	}

	/// Unregister `name`; false if nothing was registered under it
	pub fn remove_adapter(&self, authority: &RoutingAuthority, name: &str) -> RouterResult<bool> {
		self.authorize(authority, "remove adapter")?;
		Ok(self.registry.remove(name))
	}

	pub fn adapter(&self, name: &str) -> Option<RegisteredAdapter> {
		self.registry.get(name)
	}

	pub fn adapter_names(&self) -> Vec<String> {
		self.registry.names()
	}

	pub fn adapters(&self) -> Arc<[RegisteredAdapter]> {
		self.registry.snapshot()
	}

	/// Best route for converting `amount_in` of `token_in` into the target
	pub async fn find_best(&self, token_in: Token, amount_in: Amount) -> RouterResult<Quote> {
		let config = self.routing_config();
		if token_in == config.target_token {
			return Ok(Quote::identity(token_in, amount_in));
		}

		let no_route = || RouterError::NoRouteFound {
			token_in,
			target: config.target_token,
			max_hops: config.max_hops,
		};

		let adapters = self.registry.snapshot();
		if adapters.is_empty() {
			debug!("No adapters registered");
			return Err(no_route());
		}

		debug!(
			"Searching {} adapters for {} {} -> {}",
			adapters.len(),
			amount_in,
			token_in,
			config.target_token
		);

		let settings = self.settings;
		let deadline = search_deadline(settings.search_timeout_ms);

		let tasks = adapters.iter().cloned().map(|entry| {
			let config = Arc::clone(&config);
			tokio::spawn(async move {
				let name = entry.name.clone();
				let search = search_adapter(entry, token_in, amount_in, &config, &settings);
				match timeout_at(deadline, search).await {
					Ok(candidate) => candidate,
					Err(_) => {
						warn!(
							"Adapter {} did not finish within {}ms; ignoring it",
							name, settings.search_timeout_ms
						);
						None
					},
				}
			})
		});

		let mut best = None;
		for result in join_all(tasks).await {
			match result {
				Ok(Some(candidate)) => keep_best(&mut best, candidate),
				Ok(None) => {},
				Err(e) => warn!("Adapter search task failed: {}", e),
			}
		}

		let best = best.ok_or_else(no_route)?;
		let encoded_path = best.entry.adapter.encode_path(&best.path)?;

		info!(
			"Best route for {} {}: {} via {} yields {}",
			amount_in, token_in, best.path, best.entry.name, best.amount_out
		);

		Ok(Quote {
			path: best.path,
			encoded_path,
			amount_out: best.amount_out,
			amount_in,
			adapter: Some(best.entry),
		})
	}
}

/// Timeouts too large for the clock saturate to roughly thirty years
fn search_deadline(timeout_ms: u64) -> Instant {
	let now = Instant::now();
	now.checked_add(Duration::from_millis(timeout_ms))
		.unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}

fn validate_max_hops(max_hops: usize) -> RouterResult<()> {
	if max_hops == 0 {
		return Err(RouterError::invalid_configuration(
			"max hops must be at least 1",
		));
	}
	Ok(())
}

fn validate_target(target: &Token) -> RouterResult<()> {
	if target.is_zero() {
		return Err(RouterError::invalid_configuration(
			"target token cannot be the zero token",
		));
	}
	Ok(())
}

/// Exchange tokens usable as intermediate hops, in adapter order
fn intermediates(adapter: &dyn DexAdapter, start: &Token, target: &Token) -> Vec<Token> {
	let mut tokens = Vec::new();
	for token in adapter.exchange_tokens() {
		if token != start && token != target && !tokens.contains(token) {
			tokens.push(*token);
		}
	}
	tokens
}

/// Every simple path from `start` to `target` with at most `max_hops`
/// edges, shortest first, stopping once `limit` paths exist
fn enumerate_paths(
	start: Token,
	target: Token,
	intermediates: &[Token],
	max_hops: usize,
	limit: usize,
) -> Vec<Path> {
	fn extend(
		prefix: &mut Vec<Token>,
		remaining: usize,
		target: Token,
		intermediates: &[Token],
		limit: usize,
		paths: &mut Vec<Path>,
	) {
		if paths.len() >= limit {
			return;
		}
		if remaining == 0 {
			let mut tokens = prefix.clone();
			tokens.push(target);
			if let Ok(path) = Path::new(tokens) {
				paths.push(path);
			}
			return;
		}
		for token in intermediates {
			if prefix.contains(token) {
				continue;
			}
			prefix.push(*token);
			extend(prefix, remaining - 1, target, intermediates, limit, paths);
			prefix.pop();
		}
	}

	let mut paths = Vec::new();
	let max_intermediates = max_hops.min(intermediates.len() + 1);
	for depth in 0..max_intermediates {
		let mut prefix = vec![start];
		extend(&mut prefix, depth, target, intermediates, limit, &mut paths);
	}
	paths
}

async fn search_adapter(
	entry: RegisteredAdapter,
	token_in: Token,
	amount_in: Amount,
	config: &RoutingConfig,
	settings: &SearchSettings,
) -> Option<Candidate> {
	let start = entry.adapter.resolve_token_in(&token_in);
	let target = config.target_token;

	// Wrapping alone turns the input into the target
	if start == target {
		return evaluate(&entry, vec![Path::identity(start)], amount_in, settings).await;
	}

	let hops = intermediates(entry.adapter.as_ref(), &start, &target);
	let candidate = match settings.strategy {
		SearchStrategy::Exhaustive => {
			let budget = settings.max_quotes_per_adapter;
			let limit = budget.saturating_add(1);
			let mut paths = enumerate_paths(start, target, &hops, config.max_hops, limit);
			if paths.len() > budget {
				warn!(
					"Adapter {} has more than {} candidate paths; skipping the rest",
					entry.name, budget
				);
				paths.truncate(budget);
			}
			evaluate(&entry, paths, amount_in, settings).await
		},
		SearchStrategy::HopBoundedRelaxation => {
			relax(&entry, start, target, &hops, amount_in, config, settings).await
		},
	};

	match &candidate {
		Some(found) => debug!(
			"Adapter {} best path {} yields {}",
			entry.name, found.path, found.amount_out
		),
		None => debug!("Adapter {} has no route", entry.name),
	}
	candidate
}

/// Quote `paths` with bounded concurrency, in enumeration order
async fn quote_all(
	adapter: &dyn DexAdapter,
	paths: Vec<(Path, Amount)>,
	settings: &SearchSettings,
) -> Vec<(usize, Path, AdapterResult<Amount>)> {
	let mut results: Vec<_> = stream::iter(paths.into_iter().enumerate())
		.map(|(order, (path, amount_in))| async move {
			let result = adapter.quote(&path, amount_in).await;
			(order, path, result)
		})
		.buffer_unordered(settings.max_concurrent_quotes)
		.collect()
		.await;
	results.sort_by_key(|(order, _, _)| *order);
	results
}

async fn evaluate(
	entry: &RegisteredAdapter,
	paths: Vec<Path>,
	amount_in: Amount,
	settings: &SearchSettings,
) -> Option<Candidate> {
	let requests = paths.into_iter().map(|path| (path, amount_in)).collect();
	let mut best = None;

	for (order, path, result) in quote_all(entry.adapter.as_ref(), requests, settings).await {
		match result {
			Ok(0) => debug!("Adapter {} quoted zero along {}", entry.name, path),
			Ok(amount_out) => keep_best(
				&mut best,
				Candidate {
					entry: entry.clone(),
					path,
					amount_out,
					order,
				},
			),
			Err(e) => debug!("Adapter {} cannot route {}: {}", entry.name, path, e),
		}
	}
	best
}

/// Hop-bounded relaxation: each round extends every frontier path by one
/// single-hop quote and keeps the best amount per node
async fn relax(
	entry: &RegisteredAdapter,
	start: Token,
	target: Token,
	intermediates: &[Token],
	amount_in: Amount,
	config: &RoutingConfig,
	settings: &SearchSettings,
) -> Option<Candidate> {
	let adapter = entry.adapter.as_ref();
	let mut nodes = intermediates.to_vec();
	nodes.push(target);

	let mut frontier = vec![(Path::identity(start), amount_in)];
	let mut reached: Option<(Path, Amount)> = None;
	let mut budget = settings.max_quotes_per_adapter;

	for round in 0..config.max_hops {
		let mut extensions = Vec::new();
		let mut legs = Vec::new();
		for (path, amount) in &frontier {
			for next in &nodes {
				let Ok(extended) = path.extended(*next) else {
					continue;
				};
				let Ok(leg) = Path::new(vec![*path.token_out(), *next]) else {
					continue;
				};
				extensions.push(extended);
				legs.push((leg, *amount));
			}
		}
		if legs.is_empty() {
			break;
		}
		if legs.len() > budget {
			warn!(
				"Adapter {} exhausted its {} quote budget in round {}",
				entry.name, settings.max_quotes_per_adapter, round
			);
			legs.truncate(budget);
		}
		budget -= legs.len();

		let mut round_best: HashMap<Token, (Path, Amount)> = HashMap::new();
		for (order, leg, result) in quote_all(adapter, legs, settings).await {
			let amount_out = match result {
				Ok(0) => continue,
				Ok(amount_out) => amount_out,
				Err(e) => {
					debug!("Adapter {} cannot route {}: {}", entry.name, leg, e);
					continue;
				},
			};
			let node = *leg.token_out();
			let improves = round_best
				.get(&node)
				.map_or(true, |(_, known)| amount_out > *known);
			if improves {
				round_best.insert(node, (extensions[order].clone(), amount_out));
			}
		}

		if let Some((path, amount)) = round_best.remove(&target) {
			if reached.as_ref().map_or(true, |(_, known)| amount > *known) {
				reached = Some((path, amount));
			}
		}

		frontier = nodes
			.iter()
			.filter_map(|node| round_best.remove(node))
			.collect();
		if frontier.is_empty() || budget == 0 {
			break;
		}
	}

	// Re-quote end to end so the reported output matches a direct trade
	let (path, _) = reached?;
	match adapter.quote(&path, amount_in).await {
		Ok(amount_out) if amount_out > 0 => Some(Candidate {
			entry: entry.clone(),
			path,
			amount_out,
			order: 0,
		}),
		Ok(_) => None,
		Err(e) => {
			debug!("Adapter {} failed to re-quote {}: {}", entry.name, path, e);
			None
		},
	}
}
