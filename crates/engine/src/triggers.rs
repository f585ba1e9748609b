// In crates/engine/src/triggers.rs

use async_stream::stream;
use futures::Stream;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

/// A trigger source that fires immediately and then once every `period`.
///
/// Ticks missed while the runtime was busy are skipped rather than replayed in a burst.
pub fn interval_triggers(period: Duration) -> impl Stream<Item = ()> + Send {
    stream! {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            yield ();
        }
    }
}
