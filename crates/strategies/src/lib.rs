// In crates/strategies/src/lib.rs

use core_types::{MovingAveragePair, Signal};
use rust_decimal::Decimal;

pub mod error;
pub mod ma_crossover;
pub mod sma;
pub mod types;

pub use error::{Error, Result};
pub use ma_crossover::MACrossover;

/// The result of one strategy assessment: the signal plus the averages it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub signal: Signal,
    pub averages: MovingAveragePair,
}

/// The universal interface for a trading strategy.
///
/// A strategy is responsible for analyzing a close-price series and producing a trading `Signal`.
/// It is a stateful entity: it keeps the averages from its previous assessment so that a
/// crossover can be detected between consecutive calls.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Assesses the most recent closes (oldest first).
    ///
    /// On success the internal state is replaced by the averages computed from `closes`.
    /// On error the internal state is left untouched.
    fn assess(&mut self, closes: &[Decimal]) -> Result<Assessment>;

    /// The averages stored by the last successful assessment, if any.
    fn last_averages(&self) -> Option<MovingAveragePair>;

    /// The minimum number of closes `assess` needs.
    fn required_history(&self) -> usize;
}
