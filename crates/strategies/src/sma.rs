// In crates/strategies/src/sma.rs

use rust_decimal::Decimal;

/// Arithmetic mean of the last `period` values.
///
/// Returns `None` when `period` is zero or `values` holds fewer than `period` points.
pub fn simple_moving_average(values: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let sum: Decimal = window.iter().copied().sum();
    Some(sum / Decimal::from(period))
}
