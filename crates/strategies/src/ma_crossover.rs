// In crates/strategies/src/ma_crossover.rs

use crate::sma::simple_moving_average;
use crate::types::MACrossoverSettings;
use crate::{Assessment, Error, Result, Strategy};
use core_types::{MovingAveragePair, Signal};
use rust_decimal::Decimal;

/// The stateful struct for the SMA crossover strategy.
///
/// The only state carried between assessments is the previous pair of averages.
/// It starts unset, so the first assessment after construction (or `reset`) never signals.
#[derive(Debug, Clone)]
pub struct MACrossover {
    /// The configuration for this strategy instance.
    settings: MACrossoverSettings,
    /// The averages from the previous successful assessment.
    previous: Option<MovingAveragePair>,
}

impl MACrossover {
    /// Creates a new `MACrossover` strategy instance from its settings.
    pub fn new(settings: MACrossoverSettings) -> Result<Self> {
        if settings.fast_period == 0 {
            return Err(Error::InvalidSettings("fast_period must be greater than 0".into()));
        }
        if settings.fast_period >= settings.slow_period {
            return Err(Error::InvalidSettings(format!(
                "fast_period ({}) must be shorter than slow_period ({})",
                settings.fast_period, settings.slow_period
            )));
        }
        Ok(Self {
            settings,
            previous: None,
        })
    }

    /// Seeds the crossover state, as if a previous assessment had produced `previous`.
    pub fn with_state(mut self, previous: MovingAveragePair) -> Self {
        self.previous = Some(previous);
        self
    }

    /// Forgets the stored averages; the next assessment establishes a new baseline.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn settings(&self) -> &MACrossoverSettings {
        &self.settings
    }

    fn averages(&self, closes: &[Decimal]) -> Result<MovingAveragePair> {
        let insufficient = || Error::InsufficientData {
            required: self.settings.slow_period,
            available: closes.len(),
        };
        let fast = simple_moving_average(closes, self.settings.fast_period).ok_or_else(insufficient)?;
        let slow = simple_moving_average(closes, self.settings.slow_period).ok_or_else(insufficient)?;
        Ok(MovingAveragePair::new(fast, slow))
    }
}

/// Compares the previous pair with the current one. Equal averages never count as a cross.
fn crossover(previous: &MovingAveragePair, current: &MovingAveragePair) -> Signal {
    if previous.fast < previous.slow && current.fast > current.slow {
        // Fast line crossed above the slow line.
        Signal::Buy
    } else if previous.fast > previous.slow && current.fast < current.slow {
        // Fast line crossed below the slow line.
        Signal::Sell
    } else {
        Signal::Hold
    }
}

impl Strategy for MACrossover {
    fn name(&self) -> &'static str {
        "SmaCrossover"
    }

    fn assess(&mut self, closes: &[Decimal]) -> Result<Assessment> {
        let current = self.averages(closes)?;

        let signal = match &self.previous {
            Some(previous) => crossover(previous, &current),
            None => {
                tracing::debug!(fast = %current.fast, slow = %current.slow, "Crossover baseline established.");
                Signal::Hold
            }
        };

        // Update state for the next assessment, whether or not a signal fired.
        self.previous = Some(current);

        Ok(Assessment {
            signal,
            averages: current,
        })
    }

    fn last_averages(&self) -> Option<MovingAveragePair> {
        self.previous
    }

    fn required_history(&self) -> usize {
        self.settings.slow_period
    }
}
