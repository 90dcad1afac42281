use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::session::SharedSession;

/// Advance the displayed words every `period` until `cancel` fires. The
/// first tick comes one period after start because the session shows its
/// first window on creation.
pub fn spawn_rotator(
    session: SharedSession,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_secs = period.as_secs_f32(), "word rotation started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    session.lock().rotate();
                }
            }
        }

        info!("word rotation stopped");
    })
}
