//! Routers, accounts and requests shared by the integration tests

use std::sync::Arc;

use quantfi_router::mocks::{demo_settings, UNIT};
use quantfi_router::{Address, Amount, Clock, Ledger, Router, RouterBuilder, Settings, Token};
use quantfi_types::ManualClock;

/// Fixed "now" for every test router
pub const NOW: u64 = 1_700_000_000;

/// A funded user of the demo market
pub const USER: Address = Address::from_bytes([0x11; 20]);

/// Router over the demo market plus its manual clock
pub struct TestRouter {
	pub router: Router,
	pub clock: Arc<ManualClock>,
}

#[allow(dead_code)]
impl TestRouter {
	pub async fn demo() -> Self {
		Self::from_settings(demo_settings()).await
	}

	pub async fn from_settings(settings: Settings) -> Self {
		Self::from_builder(RouterBuilder::from_settings(settings)).await
	}

	pub async fn from_builder(builder: RouterBuilder) -> Self {
		let clock = Arc::new(ManualClock::new(NOW));
		let router = builder
			.with_clock(Arc::clone(&clock) as Arc<dyn Clock>)
			.build()
			.await
			.expect("demo router builds");
		Self { router, clock }
	}

	pub fn owner(&self) -> Address {
		self.router.owner()
	}

	/// Mint `amount` whole tokens to `account` and approve the executor
	pub async fn fund(&self, account: &Address, token: &Token, amount: Amount) {
		let ledger = self.router.ledger();
		ledger.mint(token, account, amount).await.unwrap();
		if !token.is_native() {
			ledger
				.approve(token, account, &self.router.executor().account(), amount)
				.await
				.unwrap();
		}
	}

	pub async fn balance(&self, account: &Address, token: &Token) -> Amount {
		self.router
			.ledger()
			.balance_of(token, account)
			.await
			.unwrap()
	}

	pub fn deadline(&self) -> u64 {
		NOW + 600
	}
}

#[allow(dead_code)]
pub fn units(whole: Amount) -> Amount {
	whole * UNIT
}
