//! Cosmetic pause between lifecycle steps

use fibery_client::LogSink;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Wait `delay`, reporting the remaining seconds once per tick
pub async fn pause(delay: Duration, log: &dyn LogSink) {
    if delay.is_zero() {
        return;
    }

    let mut remaining = delay;
    while !remaining.is_zero() {
        log.debug(format_args!(
            "{} seconds left until the next stage",
            remaining.as_secs().max(1)
        ));
        let step = remaining.min(TICK);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
    log.info(format_args!("Time has passed!"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibery_client::TracingLog;
    use std::time::Instant;

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        let start = Instant::now();
        pause(Duration::ZERO, &TracingLog::new("test")).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn waits_full_delay() {
        let start = tokio::time::Instant::now();
        pause(Duration::from_millis(2500), &TracingLog::new("test")).await;
        assert!(start.elapsed() >= Duration::from_millis(2500));
    }
}
