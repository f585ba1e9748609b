// In crates/engine/src/scheduler.rs

use crate::{Error, Result};
use anyhow::Context;
use api_client::MarketData;
use app_config::TradingSettings;
use audit_log::AuditLog;
use core_types::{Interval, OrderResult, Symbol};
use execution::Executor;
use futures::{Stream, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strategies::Strategy;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// What one cycle trades and how much history it requests.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub symbol: Symbol,
    pub interval: Interval,
    /// Fixed quantity for every order.
    pub quantity: Decimal,
    /// Candles requested per cycle.
    pub lookback: u16,
}

impl From<&TradingSettings> for CycleSettings {
    fn from(settings: &TradingSettings) -> Self {
        Self {
            symbol: settings.symbol.clone(),
            interval: settings.interval.clone(),
            quantity: settings.quantity,
            lookback: settings.lookback,
        }
    }
}

/// Where the scheduler is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Evaluating,
    Executing,
    Logged,
}

/// How a single cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still in flight; this trigger was dropped.
    Skipped,
    NoSignal,
    InsufficientData,
    DataUnavailable,
    Executed(OrderResult),
    OrderFailed,
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates the fetch → evaluate → (execute) → log cycle.
///
/// At most one cycle runs at a time. The strategy, and therefore the crossover state,
/// is only ever touched from inside a cycle.
pub struct TradingScheduler {
    settings: CycleSettings,
    market_data: Arc<dyn MarketData>,
    strategy: Mutex<Box<dyn Strategy + Send>>,
    executor: Arc<dyn Executor>,
    audit: Arc<AuditLog>,
    in_flight: AtomicBool,
    phase: watch::Sender<CyclePhase>,
}

impl TradingScheduler {
    pub fn new(
        settings: CycleSettings,
        market_data: Arc<dyn MarketData>,
        strategy: Box<dyn Strategy + Send>,
        executor: Arc<dyn Executor>,
        audit: Arc<AuditLog>,
    ) -> Result<Self> {
        let required = strategy.required_history();
        if (settings.lookback as usize) < required {
            return Err(Error::LookbackTooShort {
                lookback: settings.lookback,
                required,
            });
        }

        tracing::info!(
            symbol = %settings.symbol,
            interval = %settings.interval,
            quantity = %settings.quantity,
            strategy = strategy.name(),
            executor = executor.name(),
            "Trading scheduler created."
        );

        let (phase, _) = watch::channel(CyclePhase::Idle);
        Ok(Self {
            settings,
            market_data,
            strategy: Mutex::new(strategy),
            executor,
            audit,
            in_flight: AtomicBool::new(false),
            phase,
        })
    }

    /// Observes phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<CyclePhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> CyclePhase {
        *self.phase.borrow()
    }

    /// The averages the next cycle will compare against.
    pub async fn crossover_state(&self) -> Option<core_types::MovingAveragePair> {
        self.strategy.lock().await.last_averages()
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.phase.send_replace(phase);
    }

    /// Runs one cycle now, unless another one is in flight.
    ///
    /// Never fails: every error is recorded in the audit log and reported through the outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("A cycle is already in flight; trigger dropped.");
            return CycleOutcome::Skipped;
        }
        let _in_flight = InFlight(&self.in_flight);

        let outcome = self.cycle().await;

        self.set_phase(CyclePhase::Logged);
        tracing::debug!(?outcome, "Cycle complete.");
        self.set_phase(CyclePhase::Idle);
        outcome
    }

    async fn cycle(&self) -> CycleOutcome {
        let CycleSettings {
            symbol,
            interval,
            quantity,
            lookback,
        } = &self.settings;

        // --- 1. Fetch ---
        self.set_phase(CyclePhase::Fetching);
        let closes = match self.market_data.fetch_closes(symbol, interval, *lookback).await {
            Ok(closes) => closes,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "Cycle aborted while fetching candles.");
                self.audit.append(format!("Cycle aborted: {e}"));
                return CycleOutcome::DataUnavailable;
            }
        };
        if let Some(latest) = closes.last() {
            self.audit.append(format!("Latest candle close: {}", latest.normalize()));
        }

        // --- 2. Evaluate ---
        self.set_phase(CyclePhase::Evaluating);
        let assessment = {
            let mut strategy = self.strategy.lock().await;
            strategy.assess(&closes)
        };
        let assessment = match assessment {
            Ok(assessment) => assessment,
            Err(e) => {
                tracing::warn!(%symbol, error = %e, "Cycle aborted while evaluating.");
                self.audit.append(format!("Cycle aborted: {e}"));
                return CycleOutcome::InsufficientData;
            }
        };
        self.audit.append(format!(
            "SMA fast: {}, SMA slow: {}",
            assessment.averages.fast.normalize(),
            assessment.averages.slow.normalize()
        ));

        let Some(side) = assessment.signal.side() else {
            self.audit.append("No trade signal this round");
            return CycleOutcome::NoSignal;
        };
        tracing::info!(%symbol, signal = %assessment.signal, "Strategy generated a signal.");
        self.audit.append(format!("Trade signal detected: {}", assessment.signal));

        // --- 3. Execute ---
        self.set_phase(CyclePhase::Executing);
        match self.executor.submit(symbol, side, *quantity).await {
            Ok(result) => {
                self.audit.append(format!(
                    "{} order placed: orderId={}, executedQty={}, price={}",
                    result.side,
                    result.order_id,
                    result.executed_qty.normalize(),
                    result.price
                ));
                CycleOutcome::Executed(result)
            }
            Err(e) => {
                tracing::error!(%symbol, %side, error = %e, "Order submission failed.");
                let execution::Error::OrderRejected { payload } = e;
                self.audit.append(format!("Order failed: {payload}"));
                CycleOutcome::OrderFailed
            }
        }
    }

    /// Runs a cycle for every trigger until `shutdown` flips to `true` (or its sender is
    /// dropped) or the trigger source ends.
    ///
    /// Triggers that arrive while a cycle is still running are dropped. On exit, an
    /// in-flight cycle is allowed to finish before this returns.
    pub async fn run<T>(self: Arc<Self>, triggers: T, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()>
    where
        T: Stream<Item = ()> + Send,
    {
        tracing::info!(symbol = %self.settings.symbol, "Starting trading scheduler.");
        let mut triggers = std::pin::pin!(triggers);
        let mut in_flight: Option<JoinHandle<CycleOutcome>> = None;

        if !*shutdown.borrow_and_update() {
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            tracing::info!("Shutdown requested; stopping the cycle timer.");
                            break;
                        }
                    }
                    trigger = triggers.next() => {
                        let Some(()) = trigger else {
                            tracing::info!("Trigger source ended.");
                            break;
                        };
                        if in_flight.as_ref().is_some_and(|handle| !handle.is_finished()) {
                            tracing::debug!("Previous cycle still running; trigger dropped.");
                            continue;
                        }
                        let scheduler = Arc::clone(&self);
                        in_flight = Some(tokio::spawn(async move { scheduler.run_cycle().await }));
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            if !handle.is_finished() {
                tracing::info!("Waiting for the in-flight cycle to finish.");
            }
            let outcome = handle.await.context("trading cycle task panicked")?;
            tracing::debug!(?outcome, "Last cycle finished.");
        }

        tracing::info!("Trading scheduler stopped.");
        Ok(())
    }
}
