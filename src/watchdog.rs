//! Inactivity watchdog
//!
//! Per-session single-shot countdown that forces a disconnect after a
//! configurable silence period. The session re-arms it on every line
//! it reads and selects over [`Watchdog::expired`] alongside the read,
//! so expiry and normal exit are decided in one place.

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Instant, Sleep};

/// Resettable single-shot idle timer
///
/// Fires at most once per arming. While stopped, [`expired`] stays
/// pending forever, which makes it safe to keep in a `select!` arm.
///
/// [`expired`]: Watchdog::expired
#[derive(Debug)]
pub struct Watchdog {
    duration: Duration,
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl Watchdog {
    /// Start a countdown of the given duration
    pub fn arm(duration: Duration) -> Self {
        Self {
            duration,
            sleep: Box::pin(time::sleep(duration)),
            armed: true,
        }
    }

    /// Re-arm from now, discarding the current countdown.
    ///
    /// Also re-arms a watchdog that already fired or was stopped.
    pub fn reset(&mut self) {
        self.sleep.as_mut().reset(Instant::now() + self.duration);
        self.armed = true;
    }

    /// Cancel the countdown. Safe to call when already fired or stopped.
    pub fn stop(&mut self) {
        self.armed = false;
    }

    /// Resolves when the countdown elapses.
    ///
    /// Resolves at most once per arming; pending forever while stopped.
    /// Cancel-safe: dropping the future (as `select!` does on the other
    /// arm winning) does not lose the deadline.
    pub async fn expired(&mut self) {
        if !self.armed {
            future::pending::<()>().await;
        }
        self.sleep.as_mut().await;
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_duration() {
        let mut dog = Watchdog::arm(Duration::from_secs(300));

        // Not yet expired just before the deadline
        assert!(time::timeout(Duration::from_secs(299), dog.expired())
            .await
            .is_err());

        // Fires once the full duration has elapsed
        dog.expired().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_postpones_expiry() {
        let mut dog = Watchdog::arm(Duration::from_secs(10));

        time::sleep(Duration::from_secs(6)).await;
        dog.reset();

        // The original deadline (t=10) passes without firing
        assert!(time::timeout(Duration::from_secs(9), dog.expired())
            .await
            .is_err());

        // The re-armed deadline (t=16) does fire
        dog.expired().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_suppresses_expiry() {
        let mut dog = Watchdog::arm(Duration::from_millis(50));
        dog.stop();

        assert!(time::timeout(Duration::from_secs(60), dog.expired())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_at_most_once() {
        let mut dog = Watchdog::arm(Duration::from_millis(10));
        dog.expired().await;

        // Already fired; no second expiry without a reset
        assert!(time::timeout(Duration::from_secs(60), dog.expired())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_fire_is_safe() {
        let mut dog = Watchdog::arm(Duration::from_millis(10));
        dog.expired().await;
        dog.stop();
        dog.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_rearms_after_fire() {
        let mut dog = Watchdog::arm(Duration::from_millis(10));
        dog.expired().await;

        dog.reset();
        dog.expired().await;
    }
}
