//! 외부 데이터 제공자.

pub mod epidemic;
pub mod health;
pub mod market;
pub mod world_bank;

pub use epidemic::EpidemicTimeseriesClient;
pub use health::HealthDashboardClient;
pub use market::{MarketDataSource, YahooMarketSource};
pub use world_bank::WorldBankClient;
