use std::num::NonZeroU64;

use serde::Deserialize;

const DEFAULT_PERIOD_MS: NonZeroU64 = NonZeroU64::new(5_000).unwrap();

/// When the frame loop is allowed to write the session to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SavePolicy {
    /// Time is cut into windows of `window_ms`. Even-numbered windows are
    /// eligible, odd ones are not, and each eligible window gets at most one
    /// successful write.
    DutyCycle { window_ms: NonZeroU64 },
    /// At most one write per `interval_ms`, starting with the first tick.
    Interval { interval_ms: NonZeroU64 },
}

impl Default for SavePolicy {
    fn default() -> Self {
        SavePolicy::DutyCycle {
            window_ms: DEFAULT_PERIOD_MS,
        }
    }
}

/// Tracks the last successful save and decides whether a tick should write.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    policy: SavePolicy,
    last_saved_ms: Option<u64>,
}

impl SaveScheduler {
    pub fn new(policy: SavePolicy) -> Self {
        Self {
            policy,
            last_saved_ms: None,
        }
    }

    /// Whether a tick at `now_ms` should write.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.policy {
            SavePolicy::DutyCycle { window_ms } => {
                let window = now_ms / window_ms.get();
                let last_window = self.last_saved_ms.map(|t| t / window_ms.get());
                window % 2 == 0 && last_window != Some(window)
            }
            SavePolicy::Interval { interval_ms } => match self.last_saved_ms {
                None => true,
                // A clock that went backwards should not stall saving.
                Some(last) if now_ms < last => true,
                Some(last) => now_ms - last >= interval_ms.get(),
            },
        }
    }

    /// Record a successful write at `now_ms`. Failed writes are not recorded,
    /// so the next eligible tick tries again.
    pub fn mark_saved(&mut self, now_ms: u64) {
        self.last_saved_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(scheduler: &mut SaveScheduler, ticks: &[u64]) -> Vec<u64> {
        let mut written = Vec::new();
        for &now in ticks {
            if scheduler.is_due(now) {
                scheduler.mark_saved(now);
                written.push(now);
            }
        }
        written
    }

    #[test]
    fn duty_cycle_writes_once_per_even_window() {
        let mut scheduler = SaveScheduler::new(SavePolicy::default());
        let written = run(&mut scheduler, &[0, 2_000, 5_000, 7_000, 10_000]);
        assert_eq!(written, [0, 10_000]);
    }

    #[test]
    fn duty_cycle_skips_odd_windows_entirely() {
        let mut scheduler = SaveScheduler::new(SavePolicy::default());
        let ticks: Vec<u64> = (5_000..10_000).step_by(16).collect();
        assert!(run(&mut scheduler, &ticks).is_empty());
    }

    #[test]
    fn duty_cycle_retries_within_window_after_failure() {
        let scheduler = SaveScheduler::new(SavePolicy::default());
        assert!(scheduler.is_due(20_000));
        // Nothing marked: still due later in the same window.
        assert!(scheduler.is_due(21_000));
    }

    #[test]
    fn duty_cycle_with_realistic_epoch_times() {
        let mut scheduler = SaveScheduler::new(SavePolicy::default());
        let base = 1_700_000_000_000u64; // window index 340_000_000, even
        let ticks: Vec<u64> = (0..20_000).step_by(16).map(|dt| base + dt).collect();
        let written = run(&mut scheduler, &ticks);
        assert_eq!(written, [base, base + 10_000]);
    }

    #[test]
    fn interval_policy_spaces_writes() {
        let policy = SavePolicy::Interval {
            interval_ms: NonZeroU64::new(5_000).unwrap(),
        };
        let mut scheduler = SaveScheduler::new(policy);
        let written = run(&mut scheduler, &[0, 2_000, 5_000, 7_000, 10_000, 12_000]);
        assert_eq!(written, [0, 5_000, 10_000]);
    }

    #[test]
    fn interval_policy_survives_clock_rewind() {
        let policy = SavePolicy::Interval {
            interval_ms: NonZeroU64::new(5_000).unwrap(),
        };
        let mut scheduler = SaveScheduler::new(policy);
        scheduler.mark_saved(100_000);
        assert!(scheduler.is_due(50_000));
    }

    #[test]
    fn policy_deserializes_from_tagged_json() {
        let policy: SavePolicy =
            serde_json::from_str(r#"{"kind": "interval", "interval_ms": 2500}"#).unwrap();
        assert_eq!(
            policy,
            SavePolicy::Interval {
                interval_ms: NonZeroU64::new(2_500).unwrap()
            }
        );
        assert!(
            serde_json::from_str::<SavePolicy>(r#"{"kind": "duty_cycle", "window_ms": 0}"#)
                .is_err()
        );
    }
}
