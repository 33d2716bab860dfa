use crate::state::AppState;
use chrono::Utc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// Runs the reset rules against the current time. Save failures are logged
/// by the state layer and otherwise ignored until the next tick.
pub async fn run_reset_check(state: &AppState) {
    let outcome = state.check_resets(Utc::now()).await;
    if outcome.value.is_empty() {
        debug!("reset check: nothing due");
    }
}

/// Ticks every `every` after an initial delay of one period; the startup
/// check is run separately before the listener opens.
pub fn spawn_reset_task(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            run_reset_check(&state).await;
        }
    })
}
