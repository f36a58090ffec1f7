// Application State Module

use super::config::Config;
use crate::quotes::QuotePool;
use crate::speed::SpeedTable;
use tokio_util::sync::CancellationToken;

/// Shared application state, read-only after startup
pub struct AppState {
    pub config: Config,
    pub quotes: QuotePool,
    pub speeds: SpeedTable,
    /// Cancelled on shutdown; every stream session holds a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, quotes: QuotePool) -> Self {
        let speeds =
            SpeedTable::new(&mut rand::rng()).with_reroll(config.speed.reroll_randomized);
        Self::with_speeds(config, quotes, speeds)
    }

    pub fn with_speeds(config: Config, quotes: QuotePool, speeds: SpeedTable) -> Self {
        Self {
            config,
            quotes,
            speeds,
            shutdown: CancellationToken::new(),
        }
    }
}
