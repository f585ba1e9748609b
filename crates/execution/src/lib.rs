// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::{OrderResult, Side, Symbol};
use rust_decimal::Decimal;

pub mod error;
pub mod live;
pub mod paper;

// Re-export public types
pub use error::{Error, Result};
pub use live::LiveExecutor;
pub use paper::PaperExecutor;

/// The universal interface for an execution handler.
///
/// An `Executor` takes a market order and submits it to a target, which could be the
/// live exchange or a local paper ledger. Implementations never retry: a retried market
/// order could execute twice, so that decision belongs to the caller.
#[async_trait]
pub trait Executor: Send + Sync {
    /// The name of the executor (e.g., "LiveExecutor", "PaperExecutor").
    fn name(&self) -> &'static str;

    /// Submits a market order for `quantity` units of `symbol`.
    ///
    /// # Returns
    ///
    /// The `OrderResult` on success, or `Error::OrderRejected` carrying the exchange's
    /// raw error payload (or the local error message).
    async fn submit(&self, symbol: &Symbol, side: Side, quantity: Decimal) -> Result<OrderResult>;
}
