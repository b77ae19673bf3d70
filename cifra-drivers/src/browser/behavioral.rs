use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Default)]
/// Produces human-like pauses between browser actions.
pub struct BehavioralEngine {
    disabled: bool,
}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that never sleeps.
    pub fn instant() -> Self {
        Self { disabled: true }
    }

    /// Pick a delay between `min` and `max` milliseconds.
    pub fn pick_delay(&self, min: u64, max: u64) -> Duration {
        if self.disabled || max == 0 {
            return Duration::ZERO;
        }
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        Duration::from_millis(OsRng.gen_range(lo..=hi))
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let d = self.pick_delay(min, max);
        if !d.is_zero() {
            sleep(d).await;
        }
    }
}
