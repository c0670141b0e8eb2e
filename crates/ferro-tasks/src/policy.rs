use rand::Rng;
use std::time::Duration;

/// Randomization applied to retry delays so that tasks failing together do
/// not all come due together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Jitter {
    /// Exact delays; predictable, risks synchronized retries.
    None,
    /// Random delay in `[0, delay]`; maximum load spreading.
    Full,
    /// `delay/2 + random[0, delay/2]`; balanced, the default.
    #[default]
    Equal,
}

impl Jitter {
    fn apply(&self, delay: Duration) -> Duration {
        let ms = delay.as_millis() as u64;
        if ms == 0 {
            return Duration::ZERO;
        }
        let mut rng = rand::rng();
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(rng.random_range(0..=ms)),
            Jitter::Equal => {
                let half = ms / 2;
                let jitter = if half == 0 {
                    0
                } else {
                    rng.random_range(0..=half)
                };
                Duration::from_millis(half + jitter)
            }
        }
    }
}

/// Retry delay policy for failed tasks.
///
/// The delay for retry `n` (0-indexed) is `first × factor^n`, clamped to
/// `max`, with jitter applied last. The base is derived purely from the
/// retry counter, so jitter output never feeds back into later delays.
#[derive(Clone, Copy, Debug)]
pub struct RetryBackoff {
    /// Delay before the first retry.
    pub first: Duration,
    /// Cap on any single delay.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy.
    pub jitter: Jitter,
}

impl Default for RetryBackoff {
    /// Defaults: 30s first delay, doubling per retry, capped at 1h, equal
    /// jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(30),
            max: Duration::from_secs(3600),
            factor: 2.0,
            jitter: Jitter::default(),
        }
    }
}

impl RetryBackoff {
    /// Computes the delay for the given retry number (0-indexed).
    pub fn next(&self, retry: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = retry.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };
        self.jitter.apply(base)
    }
}
